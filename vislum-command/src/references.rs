use std::{any::Any, fmt, sync::Arc};

/// Keeps the resources used by a compiled command buffer alive.
///
/// References are only ever added. They are released together when the
/// container is dropped, which happens when the owning command buffer is
/// dropped or recompiled. Adding the same resource twice is harmless.
#[derive(Default)]
pub struct ReferenceContainer {
    references: Vec<Box<dyn Any + Send + Sync>>,
}

impl ReferenceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reference to the container.
    pub fn add<T>(&mut self, reference: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.references.push(Box::new(reference));
    }

    /// Adds every reference yielded by `references`.
    pub fn extend<T>(&mut self, references: impl IntoIterator<Item = Arc<T>>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        for reference in references {
            self.add(reference);
        }
    }

    /// Moves every reference held by `other` into this container.
    pub fn append(&mut self, other: &mut ReferenceContainer) {
        self.references.append(&mut other.references);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

impl fmt::Debug for ReferenceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceContainer")
            .field("len", &self.references.len())
            .finish()
    }
}
