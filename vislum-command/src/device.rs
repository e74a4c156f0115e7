use std::{fmt, sync::Arc};

use ash::vk;

use crate::{AshHandle, Error, VkHandle, handle::Dealloc, vk_check};

/// A logical device.
///
/// Every device-level object keeps an `Arc` to the device it was created from,
/// so the device is destroyed only after the last of them.
pub struct Device {
    inner: ash::Device,
}

impl AshHandle for Device {
    type Handle = ash::Device;

    #[inline]
    fn ash_handle(&self) -> &Self::Handle {
        &self.inner
    }
}

impl VkHandle for Device {
    type Handle = vk::Device;

    #[inline]
    fn vk_handle(&self) -> Self::Handle {
        self.inner.handle()
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("handle", &self.inner.handle())
            .finish()
    }
}

impl Device {
    /// Creates a logical device on `physical_device`.
    pub fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo<'_>,
    ) -> Result<Arc<Self>, Error> {
        let device =
            vk_check!(unsafe { instance.create_device(physical_device, create_info, None) })?;
        log::debug!("Created device {:?}", device.handle());

        Ok(Self::from_ash(device))
    }

    /// Takes ownership of an already created device.
    ///
    /// The device is destroyed when the returned object is dropped.
    pub fn from_ash(device: ash::Device) -> Arc<Self> {
        Arc::new(Self { inner: device })
    }

    /// Blocks until the device is idle.
    pub fn wait_idle(&self) -> Result<(), Error> {
        vk_check!(unsafe { self.inner.device_wait_idle() })?;
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        log::debug!("Destroying device {:?}", self.inner.handle());
        unsafe {
            self.inner.destroy_device(None);
        }
    }
}

macro_rules! impl_device_dealloc {
    ($($handle:ty => $destroy:ident),* $(,)?) => {
        $(
            impl Dealloc<$handle> for Device {
                #[inline]
                fn dealloc(&self, handle: $handle) {
                    unsafe {
                        self.inner.$destroy(handle, None);
                    }
                }
            }
        )*
    };
}

impl_device_dealloc! {
    vk::Buffer => destroy_buffer,
    vk::Image => destroy_image,
    vk::ImageView => destroy_image_view,
    vk::Pipeline => destroy_pipeline,
    vk::PipelineLayout => destroy_pipeline_layout,
    vk::RenderPass => destroy_render_pass,
    vk::Framebuffer => destroy_framebuffer,
    vk::Event => destroy_event,
    vk::QueryPool => destroy_query_pool,
    vk::DescriptorPool => destroy_descriptor_pool,
    vk::CommandPool => destroy_command_pool,
    vk::Fence => destroy_fence,
    vk::Semaphore => destroy_semaphore,
}
