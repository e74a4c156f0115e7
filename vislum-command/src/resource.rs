//! Device-level objects referenced by recorded commands.
//!
//! These are thin owners: each one holds its handle and the device that
//! destroys it. Creating the more involved objects (buffers and images with
//! bound memory, pipelines) is left to the caller, who hands the finished
//! handle over with `from_raw`.

use std::sync::Arc;

use ash::vk;

use crate::{
    AshHandle, Error, VkHandle,
    device::Device,
    handle::{Dealloc, OwnedHandle},
    vk_check,
};

macro_rules! device_object {
    (
        $(
            $(#[$meta:meta])*
            $vis:vis struct $ident:ident($handle:ty);
        )*
    ) => {
        $(
            $(#[$meta])*
            #[derive(Debug)]
            $vis struct $ident {
                handle: OwnedHandle<$handle, Device>,
            }

            impl $ident {
                #[doc = concat!("Takes ownership of a raw handle. It is destroyed when the ", stringify!($ident), " is dropped.")]
                pub fn from_raw(device: Arc<Device>, handle: $handle) -> Arc<Self> {
                    Arc::new(Self {
                        handle: OwnedHandle::new(handle, device),
                    })
                }

                #[inline]
                pub fn device(&self) -> &Arc<Device> {
                    self.handle.owner()
                }
            }

            impl VkHandle for $ident {
                type Handle = $handle;

                #[inline]
                fn vk_handle(&self) -> Self::Handle {
                    self.handle.raw()
                }
            }
        )*
    };
}

pub(crate) use device_object;

device_object! {
    pub struct Buffer(vk::Buffer);
    pub struct Image(vk::Image);
    pub struct ImageView(vk::ImageView);
    pub struct Pipeline(vk::Pipeline);
    pub struct PipelineLayout(vk::PipelineLayout);
    pub struct RenderPass(vk::RenderPass);
    pub struct Framebuffer(vk::Framebuffer);
    pub struct Event(vk::Event);
    pub struct QueryPool(vk::QueryPool);
}

impl ImageView {
    pub fn new(
        device: Arc<Device>,
        create_info: &vk::ImageViewCreateInfo<'_>,
    ) -> Result<Arc<Self>, Error> {
        let view = vk_check!(unsafe { device.ash_handle().create_image_view(create_info, None) })?;
        Ok(Self::from_raw(device, view))
    }
}

impl PipelineLayout {
    pub fn new(
        device: Arc<Device>,
        create_info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> Result<Arc<Self>, Error> {
        let layout =
            vk_check!(unsafe { device.ash_handle().create_pipeline_layout(create_info, None) })?;
        Ok(Self::from_raw(device, layout))
    }
}

impl RenderPass {
    pub fn new(
        device: Arc<Device>,
        create_info: &vk::RenderPassCreateInfo<'_>,
    ) -> Result<Arc<Self>, Error> {
        let render_pass =
            vk_check!(unsafe { device.ash_handle().create_render_pass(create_info, None) })?;
        Ok(Self::from_raw(device, render_pass))
    }
}

impl Framebuffer {
    pub fn new(
        device: Arc<Device>,
        create_info: &vk::FramebufferCreateInfo<'_>,
    ) -> Result<Arc<Self>, Error> {
        let framebuffer =
            vk_check!(unsafe { device.ash_handle().create_framebuffer(create_info, None) })?;
        Ok(Self::from_raw(device, framebuffer))
    }
}

impl Event {
    /// Creates a new event in the unsignaled state.
    pub fn new(device: Arc<Device>) -> Result<Arc<Self>, Error> {
        let create_info = vk::EventCreateInfo::default();
        let event = vk_check!(unsafe { device.ash_handle().create_event(&create_info, None) })?;
        Ok(Self::from_raw(device, event))
    }

    /// Returns whether the event is signaled.
    pub fn is_set(&self) -> Result<bool, Error> {
        let status = vk_check!(unsafe { self.device().ash_handle().get_event_status(self.vk_handle()) })?;
        Ok(status)
    }

    /// Signals the event from the host.
    pub fn set(&self) -> Result<(), Error> {
        vk_check!(unsafe { self.device().ash_handle().set_event(self.vk_handle()) })?;
        Ok(())
    }

    /// Unsignals the event from the host.
    pub fn reset(&self) -> Result<(), Error> {
        vk_check!(unsafe { self.device().ash_handle().reset_event(self.vk_handle()) })?;
        Ok(())
    }
}

impl QueryPool {
    pub fn new(
        device: Arc<Device>,
        query_type: vk::QueryType,
        query_count: u32,
        pipeline_statistics: vk::QueryPipelineStatisticFlags,
    ) -> Result<Arc<Self>, Error> {
        let create_info = vk::QueryPoolCreateInfo::default()
            .query_type(query_type)
            .query_count(query_count)
            .pipeline_statistics(pipeline_statistics);

        let pool = vk_check!(unsafe { device.ash_handle().create_query_pool(&create_info, None) })?;
        Ok(Self::from_raw(device, pool))
    }
}

/// A pool that descriptor sets are allocated from.
#[derive(Debug)]
pub struct DescriptorPool {
    handle: OwnedHandle<vk::DescriptorPool, Device>,
    free_individually: bool,
}

impl VkHandle for DescriptorPool {
    type Handle = vk::DescriptorPool;

    #[inline]
    fn vk_handle(&self) -> Self::Handle {
        self.handle.raw()
    }
}

impl DescriptorPool {
    pub fn new(
        device: Arc<Device>,
        create_info: &vk::DescriptorPoolCreateInfo<'_>,
    ) -> Result<Arc<Self>, Error> {
        let pool =
            vk_check!(unsafe { device.ash_handle().create_descriptor_pool(create_info, None) })?;

        Ok(Arc::new(Self {
            handle: OwnedHandle::new(pool, device),
            free_individually: create_info
                .flags
                .contains(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET),
        }))
    }

    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        self.handle.owner()
    }

    /// Allocates one descriptor set per layout, in order.
    pub fn allocate(
        self: &Arc<Self>,
        layouts: &[vk::DescriptorSetLayout],
    ) -> Result<Vec<Arc<DescriptorSet>>, Error> {
        if layouts.is_empty() {
            return Ok(Vec::new());
        }

        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.vk_handle())
            .set_layouts(layouts);

        let sets = vk_check!(unsafe {
            self.device()
                .ash_handle()
                .allocate_descriptor_sets(&allocate_info)
        })?;

        Ok(sets
            .into_iter()
            .map(|set| {
                Arc::new(DescriptorSet {
                    handle: OwnedHandle::new(set, Arc::clone(self)),
                })
            })
            .collect())
    }
}

impl Dealloc<vk::DescriptorSet> for DescriptorPool {
    fn dealloc(&self, handle: vk::DescriptorSet) {
        // Without FREE_DESCRIPTOR_SET the sets are only released with the pool.
        if !self.free_individually {
            return;
        }

        let result = unsafe {
            self.device()
                .ash_handle()
                .free_descriptor_sets(self.vk_handle(), std::slice::from_ref(&handle))
        };

        if let Err(e) = result {
            log::error!("failed to free descriptor set {handle:?}: {e}");
        }
    }
}

/// A descriptor set, freed back to its pool when dropped.
#[derive(Debug)]
pub struct DescriptorSet {
    handle: OwnedHandle<vk::DescriptorSet, DescriptorPool>,
}

impl DescriptorSet {
    #[inline]
    pub fn pool(&self) -> &Arc<DescriptorPool> {
        self.handle.owner()
    }
}

impl VkHandle for DescriptorSet {
    type Handle = vk::DescriptorSet;

    #[inline]
    fn vk_handle(&self) -> Self::Handle {
        self.handle.raw()
    }
}
