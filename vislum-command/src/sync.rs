use std::sync::Arc;

use ash::vk;

use crate::{
    AshHandle, Error, VkHandle,
    device::Device,
    handle::OwnedHandle,
    resource::device_object,
    vk_check,
};

device_object! {
    /// A Vulkan fence.
    pub struct Fence(vk::Fence);

    /// A Vulkan semaphore.
    pub struct Semaphore(vk::Semaphore);
}

impl Fence {
    pub fn new(device: Arc<Device>, signaled: bool) -> Result<Arc<Self>, Error> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };

        let create_info = vk::FenceCreateInfo::default().flags(flags);
        let fence = vk_check!(unsafe { device.ash_handle().create_fence(&create_info, None) })?;

        Ok(Self::from_raw(device, fence))
    }

    /// Waits for the fence to be signaled.
    /// Returns true if the fence was signaled, false if the wait timed out.
    pub fn wait(&self, timeout: u64) -> Result<bool, Error> {
        let fences = [self.vk_handle()];
        match unsafe { self.device().ash_handle().wait_for_fences(&fences, true, timeout) } {
            Err(vk::Result::TIMEOUT) => Ok(false),
            result => {
                vk_check!(result)?;
                Ok(true)
            }
        }
    }

    /// Resets the fence to unsignaled state.
    pub fn reset(&self) -> Result<(), Error> {
        let fences = [self.vk_handle()];
        vk_check!(unsafe { self.device().ash_handle().reset_fences(&fences) })?;
        Ok(())
    }
}

impl Semaphore {
    pub fn new(device: Arc<Device>) -> Result<Arc<Self>, Error> {
        let create_info = vk::SemaphoreCreateInfo::default();
        let semaphore =
            vk_check!(unsafe { device.ash_handle().create_semaphore(&create_info, None) })?;

        Ok(Self::from_raw(device, semaphore))
    }
}
