use std::sync::Arc;

pub mod command;
pub mod device;
pub mod error;
pub mod handle;
pub mod hook;
pub mod queue;
pub mod references;
pub mod render_thread;
pub mod resource;
pub mod sync;

mod macros;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, VkError, vk_result_name};

/// A trait for objects that wrap Vulkan handles.
pub trait VkHandle {
    type Handle: ash::vk::Handle + Copy;

    /// Returns the Vulkan handle of the object.
    fn vk_handle(&self) -> Self::Handle;
}

/// A trait for objects that wrap Ash handles.
pub trait AshHandle {
    type Handle;

    fn ash_handle(&self) -> &Self::Handle;
}

/// A shared, owning reference to a resource that resolves to a `H` handle.
///
/// Commands hold these instead of raw handles. The handle is only read when the
/// command is recorded, and the reference is kept alive by the command buffer
/// that recorded it.
pub type Shared<H> = Arc<dyn VkHandle<Handle = H> + Send + Sync>;
