use std::sync::Arc;

use ash::vk;
use smallvec::SmallVec;

use crate::{
    AshHandle, Error, VkHandle,
    command::CommandBuffer,
    device::Device,
    sync::{Fence, Semaphore},
    vk_check,
};

/// The view of a queue that pre-execute hooks receive.
pub trait SubmissionQueue: VkHandle<Handle = vk::Queue> + Send + Sync {
    /// The family the queue belongs to.
    fn family_index(&self) -> u32;
}

pub struct Queue {
    device: Arc<Device>,
    queue: vk::Queue,
    family_index: u32,
}

impl VkHandle for Queue {
    type Handle = vk::Queue;

    #[inline]
    fn vk_handle(&self) -> Self::Handle {
        self.queue
    }
}

impl SubmissionQueue for Queue {
    #[inline]
    fn family_index(&self) -> u32 {
        self.family_index
    }
}

impl Queue {
    pub fn new(device: Arc<Device>, family_index: u32, queue_index: u32) -> Arc<Self> {
        let queue = unsafe {
            device
                .ash_handle()
                .get_device_queue(family_index, queue_index)
        };

        Arc::new(Self {
            device,
            queue,
            family_index,
        })
    }

    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    /// Submits compiled command buffers to this queue.
    ///
    /// The pre-execute hooks of every buffer run first, in order. If any of
    /// them fails nothing is submitted.
    pub fn submit(
        &self,
        command_buffers: &[&CommandBuffer],
        wait_semaphores: &[(&Semaphore, vk::PipelineStageFlags)],
        signal_semaphores: &[&Semaphore],
        fence: Option<&Fence>,
    ) -> Result<(), Error> {
        for command_buffer in command_buffers {
            command_buffer.prepare_submit(self)?;
        }

        let buffer_handles: SmallVec<[vk::CommandBuffer; 4]> =
            command_buffers.iter().map(|b| b.vk_handle()).collect();
        let wait_semaphore_handles: SmallVec<[vk::Semaphore; 4]> =
            wait_semaphores.iter().map(|(s, _)| s.vk_handle()).collect();
        let wait_dst_stage_masks: SmallVec<[vk::PipelineStageFlags; 4]> =
            wait_semaphores.iter().map(|(_, stage)| *stage).collect();
        let signal_semaphore_handles: SmallVec<[vk::Semaphore; 4]> =
            signal_semaphores.iter().map(|s| s.vk_handle()).collect();

        let submit_info = vk::SubmitInfo::default()
            .command_buffers(&buffer_handles)
            .wait_semaphores(&wait_semaphore_handles)
            .wait_dst_stage_mask(&wait_dst_stage_masks)
            .signal_semaphores(&signal_semaphore_handles);

        let fence_handle = fence.map(|f| f.vk_handle()).unwrap_or(vk::Fence::null());

        log::trace!(
            "Submitting {} command buffer(s) to queue {:?}",
            buffer_handles.len(),
            self.queue
        );

        vk_check!(unsafe {
            self.device.ash_handle().queue_submit(
                self.queue,
                std::slice::from_ref(&submit_info),
                fence_handle,
            )
        })?;

        Ok(())
    }

    pub fn wait_idle(&self) -> Result<(), Error> {
        vk_check!(unsafe { self.device.ash_handle().queue_wait_idle(self.queue) })?;
        Ok(())
    }
}
