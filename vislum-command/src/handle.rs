use std::{fmt, sync::Arc};

use ash::vk::Handle;

use crate::VkHandle;

/// An owner that knows how to release handles of type `H`.
///
/// Implemented by the device for device-level objects and by pools for the
/// objects allocated from them.
pub trait Dealloc<H>: Send + Sync {
    /// Releases `handle`. Called at most once per handle.
    fn dealloc(&self, handle: H);
}

/// A uniquely owned native handle bound to the object that releases it.
///
/// The owner is kept alive for as long as the handle is, so the release call
/// always has a valid device or pool to go through. The owner itself must
/// still outlive every handle created from it, which the `Arc` guarantees.
pub struct OwnedHandle<H, O>
where
    H: Handle + Copy,
    O: Dealloc<H> + ?Sized,
{
    handle: H,
    owner: Arc<O>,
}

impl<H, O> OwnedHandle<H, O>
where
    H: Handle + Copy,
    O: Dealloc<H> + ?Sized,
{
    /// Takes ownership of `handle`.
    pub fn new(handle: H, owner: Arc<O>) -> Self {
        Self { handle, owner }
    }

    #[inline]
    pub fn raw(&self) -> H {
        self.handle
    }

    #[inline]
    pub fn owner(&self) -> &Arc<O> {
        &self.owner
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.handle.as_raw() == 0
    }

    /// Gives up ownership of the handle without releasing it.
    pub fn into_raw(mut self) -> H {
        std::mem::replace(&mut self.handle, H::from_raw(0))
    }
}

impl<H, O> VkHandle for OwnedHandle<H, O>
where
    H: Handle + Copy,
    O: Dealloc<H> + ?Sized,
{
    type Handle = H;

    #[inline]
    fn vk_handle(&self) -> Self::Handle {
        self.handle
    }
}

impl<H, O> fmt::Debug for OwnedHandle<H, O>
where
    H: Handle + Copy,
    O: Dealloc<H> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(0x{:X})", H::TYPE, self.handle.as_raw())
    }
}

impl<H, O> Drop for OwnedHandle<H, O>
where
    H: Handle + Copy,
    O: Dealloc<H> + ?Sized,
{
    fn drop(&mut self) {
        if !self.is_null() {
            self.owner.dealloc(self.handle);
        }
    }
}
