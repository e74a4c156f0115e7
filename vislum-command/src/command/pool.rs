use std::{fmt, sync::Arc};

use ash::vk;

use crate::{
    AshHandle, Error, VkHandle,
    device::Device,
    handle::{Dealloc, OwnedHandle},
    vk_check,
};

use super::{
    buffer::CommandBuffer,
    native::{AshRecorder, CommandRecorder},
    types::CommandBufferLevel,
};

/// A pool command buffers are allocated from and freed back to.
pub trait RawCommandPool: Dealloc<vk::CommandBuffer> + Send + Sync {
    /// Allocates `count` command buffers of `level` in one native call.
    fn allocate_raw(
        &self,
        level: CommandBufferLevel,
        count: u32,
    ) -> Result<Vec<vk::CommandBuffer>, Error>;

    /// Returns a recorder that writes into `buffer`.
    fn recorder(&self, buffer: vk::CommandBuffer) -> Box<dyn CommandRecorder + '_>;
}

/// Allocates `count` command buffers from `pool`.
///
/// Either all `count` buffers are returned, in the order the pool produced
/// them, or none are.
pub fn allocate<P>(
    pool: &Arc<P>,
    level: CommandBufferLevel,
    count: u32,
) -> Result<Vec<CommandBuffer>, Error>
where
    P: RawCommandPool + 'static,
{
    if count == 0 {
        return Ok(Vec::new());
    }

    let handles = pool.allocate_raw(level, count)?;
    if handles.len() != count as usize {
        log::error!(
            "Pool returned {} of {} requested command buffers",
            handles.len(),
            count
        );

        for handle in handles.iter().copied() {
            pool.dealloc(handle);
        }

        return Err(Error::IncompleteAllocation {
            requested: count,
            allocated: handles.len(),
        });
    }

    log::debug!("Allocated {count} {level} command buffer(s)");

    let owner: Arc<dyn RawCommandPool> = pool.clone();
    Ok(handles
        .into_iter()
        .map(|handle| CommandBuffer::new(OwnedHandle::new(handle, Arc::clone(&owner)), level))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandPoolCreateInfo {
    pub queue_family_index: u32,
    pub transient: bool,
    pub reset_command_buffer: bool,
}

impl CommandPoolCreateInfo {
    fn flags(&self) -> vk::CommandPoolCreateFlags {
        let mut flags = vk::CommandPoolCreateFlags::empty();
        if self.transient {
            flags |= vk::CommandPoolCreateFlags::TRANSIENT;
        }
        if self.reset_command_buffer {
            flags |= vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER;
        }

        flags
    }
}

/// A Vulkan command pool.
///
/// Command buffers allocated from the pool keep it alive, so it is destroyed
/// only after the last of them has been freed.
pub struct CommandPool {
    handle: OwnedHandle<vk::CommandPool, Device>,
    queue_family_index: u32,
}

impl VkHandle for CommandPool {
    type Handle = vk::CommandPool;

    #[inline]
    fn vk_handle(&self) -> Self::Handle {
        self.handle.raw()
    }
}

impl fmt::Debug for CommandPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandPool")
            .field("handle", &self.handle)
            .field("queue_family_index", &self.queue_family_index)
            .finish()
    }
}

impl CommandPool {
    /// Creates a new command pool.
    pub fn new(device: Arc<Device>, create_info: CommandPoolCreateInfo) -> Result<Arc<Self>, Error> {
        let pool_create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(create_info.queue_family_index)
            .flags(create_info.flags());

        let pool = vk_check!(unsafe {
            device
                .ash_handle()
                .create_command_pool(&pool_create_info, None)
        })?;

        Ok(Arc::new(Self {
            handle: OwnedHandle::new(pool, device),
            queue_family_index: create_info.queue_family_index,
        }))
    }

    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        self.handle.owner()
    }

    #[inline]
    pub fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }

    /// Allocates `count` command buffers from the pool.
    pub fn allocate(
        self: &Arc<Self>,
        level: CommandBufferLevel,
        count: u32,
    ) -> Result<Vec<CommandBuffer>, Error> {
        allocate(self, level, count)
    }

    /// Resets every command buffer allocated from the pool.
    ///
    /// # Safety
    /// None of the pool's command buffers may be pending execution.
    pub unsafe fn reset(&self, release_resources: bool) -> Result<(), Error> {
        let flags = if release_resources {
            vk::CommandPoolResetFlags::RELEASE_RESOURCES
        } else {
            vk::CommandPoolResetFlags::empty()
        };

        vk_check!(unsafe {
            self.device()
                .ash_handle()
                .reset_command_pool(self.vk_handle(), flags)
        })?;
        Ok(())
    }
}

impl Dealloc<vk::CommandBuffer> for CommandPool {
    fn dealloc(&self, handle: vk::CommandBuffer) {
        unsafe {
            self.device()
                .ash_handle()
                .free_command_buffers(self.vk_handle(), std::slice::from_ref(&handle));
        }
    }
}

impl RawCommandPool for CommandPool {
    fn allocate_raw(
        &self,
        level: CommandBufferLevel,
        count: u32,
    ) -> Result<Vec<vk::CommandBuffer>, Error> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.vk_handle())
            .level(level.to_vk())
            .command_buffer_count(count);

        let buffers = vk_check!(unsafe {
            self.device()
                .ash_handle()
                .allocate_command_buffers(&alloc_info)
        })?;
        Ok(buffers)
    }

    fn recorder(&self, buffer: vk::CommandBuffer) -> Box<dyn CommandRecorder + '_> {
        Box::new(AshRecorder::new(self.device().ash_handle(), buffer))
    }
}
