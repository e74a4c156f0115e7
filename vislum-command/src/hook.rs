use std::fmt;

use crate::{Error, queue::SubmissionQueue};

type Hook<A> = Box<dyn Fn(&A) -> Result<(), Error> + Send + Sync>;

/// An ordered list of callbacks invoked with an `A`.
pub struct HookList<A: ?Sized> {
    hooks: Vec<Hook<A>>,
}

/// Hooks run against the submission queue right before a command buffer is
/// submitted.
pub type PreExecuteHooks = HookList<dyn SubmissionQueue>;

impl<A: ?Sized> Default for HookList<A> {
    fn default() -> Self {
        Self { hooks: Vec::new() }
    }
}

impl<A: ?Sized> HookList<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook. Hooks run in the order they were added.
    pub fn add<F>(&mut self, hook: F)
    where
        F: Fn(&A) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Runs every hook in order, stopping at the first failure.
    pub fn invoke(&self, argument: &A) -> Result<(), Error> {
        for hook in &self.hooks {
            hook(argument)?;
        }

        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<A: ?Sized> fmt::Debug for HookList<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookList")
            .field("len", &self.hooks.len())
            .finish()
    }
}
