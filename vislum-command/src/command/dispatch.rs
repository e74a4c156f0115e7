use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use ash::vk::{self, Handle};
use smallvec::SmallVec;

use crate::{
    Error, VkHandle,
    hook::PreExecuteHooks,
    queue::SubmissionQueue,
    references::ReferenceContainer,
};

use super::{
    native::{CommandRecorder, NativeCall},
    types::{
        BufferMemoryBarrier, Command, CommandBufferLevel, ImageMemoryBarrier, MemoryBarrier,
        RenderPassScope,
    },
};

/// Largest payload `vkCmdUpdateBuffer` accepts.
const MAX_UPDATE_BUFFER_SIZE: usize = 65536;

/// The state of a single compilation.
///
/// Every resource a recorded command references is kept in the context's
/// reference container, and hooks registered while recording end up in its
/// pre-execute hook list. Both are handed over with [`RecordingContext::finish`].
pub struct RecordingContext<'r> {
    recorder: &'r mut dyn CommandRecorder,
    references: ReferenceContainer,
    pre_execute_hooks: PreExecuteHooks,
}

impl<'r> RecordingContext<'r> {
    pub fn new(recorder: &'r mut dyn CommandRecorder) -> Self {
        Self {
            recorder,
            references: ReferenceContainer::new(),
            pre_execute_hooks: PreExecuteHooks::new(),
        }
    }

    #[inline]
    pub fn references(&self) -> &ReferenceContainer {
        &self.references
    }

    #[inline]
    pub fn references_mut(&mut self) -> &mut ReferenceContainer {
        &mut self.references
    }

    #[inline]
    pub fn pre_execute_hooks(&self) -> &PreExecuteHooks {
        &self.pre_execute_hooks
    }

    /// Registers a hook to run against the queue each time the compiled buffer
    /// is submitted.
    pub fn add_pre_execute_hook<F>(&mut self, hook: F)
    where
        F: Fn(&(dyn SubmissionQueue + 'static)) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.pre_execute_hooks.add(hook);
    }

    pub fn finish(self) -> (ReferenceContainer, PreExecuteHooks) {
        (self.references, self.pre_execute_hooks)
    }

    /// Records every command in order, stopping at the first failure.
    pub fn record_all(&mut self, commands: &[Command]) -> Result<(), Error> {
        for command in commands {
            self.record(command)?;
        }

        Ok(())
    }

    /// Records a single command.
    pub fn record(&mut self, command: &Command) -> Result<(), Error> {
        let name = command.name();

        match command {
            Command::BindPipeline {
                bind_point,
                pipeline,
            } => {
                let pipeline = self.resolve(name, pipeline)?;
                self.emit(NativeCall::BindPipeline {
                    bind_point: *bind_point,
                    pipeline,
                });
            }
            Command::SetViewport {
                first_viewport,
                viewports,
            } => self.emit(NativeCall::SetViewport {
                first_viewport: *first_viewport,
                viewports,
            }),
            Command::SetScissor {
                first_scissor,
                scissors,
            } => self.emit(NativeCall::SetScissor {
                first_scissor: *first_scissor,
                scissors,
            }),
            Command::SetLineWidth { line_width } => self.emit(NativeCall::SetLineWidth {
                line_width: *line_width,
            }),
            Command::SetDepthBias {
                constant_factor,
                clamp,
                slope_factor,
            } => self.emit(NativeCall::SetDepthBias {
                constant_factor: *constant_factor,
                clamp: *clamp,
                slope_factor: *slope_factor,
            }),
            Command::SetBlendConstants { blend_constants } => {
                self.emit(NativeCall::SetBlendConstants { blend_constants })
            }
            Command::SetDepthBounds {
                min_depth_bounds,
                max_depth_bounds,
            } => self.emit(NativeCall::SetDepthBounds {
                min_depth_bounds: *min_depth_bounds,
                max_depth_bounds: *max_depth_bounds,
            }),
            Command::SetStencilCompareMask {
                face_mask,
                compare_mask,
            } => self.emit(NativeCall::SetStencilCompareMask {
                face_mask: *face_mask,
                compare_mask: *compare_mask,
            }),
            Command::SetStencilWriteMask {
                face_mask,
                write_mask,
            } => self.emit(NativeCall::SetStencilWriteMask {
                face_mask: *face_mask,
                write_mask: *write_mask,
            }),
            Command::SetStencilReference {
                face_mask,
                reference,
            } => self.emit(NativeCall::SetStencilReference {
                face_mask: *face_mask,
                reference: *reference,
            }),
            Command::BindDescriptorSets {
                bind_point,
                layout,
                first_set,
                descriptor_sets,
                dynamic_offsets,
            } => {
                let layout = self.resolve(name, layout)?;
                let descriptor_sets = self.resolve_all(name, descriptor_sets)?;
                self.emit(NativeCall::BindDescriptorSets {
                    bind_point: *bind_point,
                    layout,
                    first_set: *first_set,
                    descriptor_sets: &descriptor_sets,
                    dynamic_offsets,
                });
            }
            Command::BindIndexBuffer {
                buffer,
                offset,
                index_type,
            } => {
                let buffer = self.resolve(name, buffer)?;
                self.emit(NativeCall::BindIndexBuffer {
                    buffer,
                    offset: *offset,
                    index_type: *index_type,
                });
            }
            Command::BindVertexBuffers {
                first_binding,
                buffers,
                offsets,
            } => {
                if buffers.len() != offsets.len() {
                    return Err(Error::InvalidCommand {
                        command: name,
                        reason: "every vertex buffer needs exactly one offset",
                    });
                }

                let buffers = self.resolve_all(name, buffers)?;
                self.emit(NativeCall::BindVertexBuffers {
                    first_binding: *first_binding,
                    buffers: &buffers,
                    offsets,
                });
            }
            Command::Draw {
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            } => self.emit(NativeCall::Draw {
                vertex_count: *vertex_count,
                instance_count: *instance_count,
                first_vertex: *first_vertex,
                first_instance: *first_instance,
            }),
            Command::DrawIndexed {
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            } => self.emit(NativeCall::DrawIndexed {
                index_count: *index_count,
                instance_count: *instance_count,
                first_index: *first_index,
                vertex_offset: *vertex_offset,
                first_instance: *first_instance,
            }),
            Command::DrawIndirect {
                buffer,
                offset,
                draw_count,
                stride,
            } => {
                let buffer = self.resolve(name, buffer)?;
                self.emit(NativeCall::DrawIndirect {
                    buffer,
                    offset: *offset,
                    draw_count: *draw_count,
                    stride: *stride,
                });
            }
            Command::DrawIndexedIndirect {
                buffer,
                offset,
                draw_count,
                stride,
            } => {
                let buffer = self.resolve(name, buffer)?;
                self.emit(NativeCall::DrawIndexedIndirect {
                    buffer,
                    offset: *offset,
                    draw_count: *draw_count,
                    stride: *stride,
                });
            }
            Command::Dispatch {
                group_count_x,
                group_count_y,
                group_count_z,
            } => self.emit(NativeCall::Dispatch {
                group_count_x: *group_count_x,
                group_count_y: *group_count_y,
                group_count_z: *group_count_z,
            }),
            Command::DispatchIndirect { buffer, offset } => {
                let buffer = self.resolve(name, buffer)?;
                self.emit(NativeCall::DispatchIndirect {
                    buffer,
                    offset: *offset,
                });
            }
            Command::CopyBuffer {
                src_buffer,
                dst_buffer,
                regions,
            } => {
                let src_buffer = self.resolve(name, src_buffer)?;
                let dst_buffer = self.resolve(name, dst_buffer)?;
                self.emit(NativeCall::CopyBuffer {
                    src_buffer,
                    dst_buffer,
                    regions,
                });
            }
            Command::CopyImage {
                src_image,
                src_image_layout,
                dst_image,
                dst_image_layout,
                regions,
            } => {
                let src_image = self.resolve(name, src_image)?;
                let dst_image = self.resolve(name, dst_image)?;
                self.emit(NativeCall::CopyImage {
                    src_image,
                    src_image_layout: *src_image_layout,
                    dst_image,
                    dst_image_layout: *dst_image_layout,
                    regions,
                });
            }
            Command::BlitImage {
                src_image,
                src_image_layout,
                dst_image,
                dst_image_layout,
                regions,
                filter,
            } => {
                let src_image = self.resolve(name, src_image)?;
                let dst_image = self.resolve(name, dst_image)?;
                self.emit(NativeCall::BlitImage {
                    src_image,
                    src_image_layout: *src_image_layout,
                    dst_image,
                    dst_image_layout: *dst_image_layout,
                    regions,
                    filter: *filter,
                });
            }
            Command::CopyBufferToImage {
                src_buffer,
                dst_image,
                dst_image_layout,
                regions,
            } => {
                let src_buffer = self.resolve(name, src_buffer)?;
                let dst_image = self.resolve(name, dst_image)?;
                self.emit(NativeCall::CopyBufferToImage {
                    src_buffer,
                    dst_image,
                    dst_image_layout: *dst_image_layout,
                    regions,
                });
            }
            Command::CopyImageToBuffer {
                src_image,
                src_image_layout,
                dst_buffer,
                regions,
            } => {
                let src_image = self.resolve(name, src_image)?;
                let dst_buffer = self.resolve(name, dst_buffer)?;
                self.emit(NativeCall::CopyImageToBuffer {
                    src_image,
                    src_image_layout: *src_image_layout,
                    dst_buffer,
                    regions,
                });
            }
            Command::UpdateBuffer {
                dst_buffer,
                dst_offset,
                data,
            } => {
                validate_update(name, *dst_offset, data)?;

                let dst_buffer = self.resolve(name, dst_buffer)?;
                self.emit(NativeCall::UpdateBuffer {
                    dst_buffer,
                    dst_offset: *dst_offset,
                    data,
                });
            }
            Command::FillBuffer {
                dst_buffer,
                dst_offset,
                size,
                data,
            } => {
                let dst_buffer = self.resolve(name, dst_buffer)?;
                self.emit(NativeCall::FillBuffer {
                    dst_buffer,
                    dst_offset: *dst_offset,
                    size: *size,
                    data: *data,
                });
            }
            Command::ClearColorImage {
                image,
                image_layout,
                color,
                ranges,
            } => {
                let image = self.resolve(name, image)?;
                self.emit(NativeCall::ClearColorImage {
                    image,
                    image_layout: *image_layout,
                    color,
                    ranges,
                });
            }
            Command::ClearDepthStencilImage {
                image,
                image_layout,
                depth_stencil,
                ranges,
            } => {
                let image = self.resolve(name, image)?;
                self.emit(NativeCall::ClearDepthStencilImage {
                    image,
                    image_layout: *image_layout,
                    depth_stencil,
                    ranges,
                });
            }
            Command::ClearAttachments { attachments, rects } => {
                self.emit(NativeCall::ClearAttachments { attachments, rects })
            }
            Command::ResolveImage {
                src_image,
                src_image_layout,
                dst_image,
                dst_image_layout,
                regions,
            } => {
                let src_image = self.resolve(name, src_image)?;
                let dst_image = self.resolve(name, dst_image)?;
                self.emit(NativeCall::ResolveImage {
                    src_image,
                    src_image_layout: *src_image_layout,
                    dst_image,
                    dst_image_layout: *dst_image_layout,
                    regions,
                });
            }
            Command::SetEvent { event, stage_mask } => {
                let event = self.resolve(name, event)?;
                self.emit(NativeCall::SetEvent {
                    event,
                    stage_mask: *stage_mask,
                });
            }
            Command::ResetEvent { event, stage_mask } => {
                let event = self.resolve(name, event)?;
                self.emit(NativeCall::ResetEvent {
                    event,
                    stage_mask: *stage_mask,
                });
            }
            Command::WaitEvents {
                events,
                src_stage_mask,
                dst_stage_mask,
                memory_barriers,
                buffer_memory_barriers,
                image_memory_barriers,
            } => {
                let events = self.resolve_all(name, events)?;
                let memory_barriers = translate_memory_barriers(memory_barriers);
                let buffer_memory_barriers =
                    self.translate_buffer_barriers(name, buffer_memory_barriers)?;
                let image_memory_barriers =
                    self.translate_image_barriers(name, image_memory_barriers)?;

                self.emit(NativeCall::WaitEvents {
                    events: &events,
                    src_stage_mask: *src_stage_mask,
                    dst_stage_mask: *dst_stage_mask,
                    memory_barriers: &memory_barriers,
                    buffer_memory_barriers: &buffer_memory_barriers,
                    image_memory_barriers: &image_memory_barriers,
                });
            }
            Command::PipelineBarrier {
                src_stage_mask,
                dst_stage_mask,
                dependency_flags,
                memory_barriers,
                buffer_memory_barriers,
                image_memory_barriers,
            } => {
                let memory_barriers = translate_memory_barriers(memory_barriers);
                let buffer_memory_barriers =
                    self.translate_buffer_barriers(name, buffer_memory_barriers)?;
                let image_memory_barriers =
                    self.translate_image_barriers(name, image_memory_barriers)?;

                self.emit(NativeCall::PipelineBarrier {
                    src_stage_mask: *src_stage_mask,
                    dst_stage_mask: *dst_stage_mask,
                    dependency_flags: *dependency_flags,
                    memory_barriers: &memory_barriers,
                    buffer_memory_barriers: &buffer_memory_barriers,
                    image_memory_barriers: &image_memory_barriers,
                });
            }
            Command::BeginQuery {
                query_pool,
                query,
                flags,
            } => {
                let query_pool = self.resolve(name, query_pool)?;
                self.emit(NativeCall::BeginQuery {
                    query_pool,
                    query: *query,
                    flags: *flags,
                });
            }
            Command::EndQuery { query_pool, query } => {
                let query_pool = self.resolve(name, query_pool)?;
                self.emit(NativeCall::EndQuery {
                    query_pool,
                    query: *query,
                });
            }
            Command::ResetQueryPool {
                query_pool,
                first_query,
                query_count,
            } => {
                let query_pool = self.resolve(name, query_pool)?;
                self.emit(NativeCall::ResetQueryPool {
                    query_pool,
                    first_query: *first_query,
                    query_count: *query_count,
                });
            }
            Command::WriteTimestamp {
                pipeline_stage,
                query_pool,
                query,
            } => {
                let query_pool = self.resolve(name, query_pool)?;
                self.emit(NativeCall::WriteTimestamp {
                    pipeline_stage: *pipeline_stage,
                    query_pool,
                    query: *query,
                });
            }
            Command::CopyQueryPoolResults {
                query_pool,
                first_query,
                query_count,
                dst_buffer,
                dst_offset,
                stride,
                flags,
            } => {
                let query_pool = self.resolve(name, query_pool)?;
                let dst_buffer = self.resolve(name, dst_buffer)?;
                self.emit(NativeCall::CopyQueryPoolResults {
                    query_pool,
                    first_query: *first_query,
                    query_count: *query_count,
                    dst_buffer,
                    dst_offset: *dst_offset,
                    stride: *stride,
                    flags: *flags,
                });
            }
            Command::PushConstants {
                layout,
                stage_flags,
                offset,
                values,
            } => {
                validate_push_constants(name, *offset, values)?;
                let layout = self.resolve(name, layout)?;
                self.emit(NativeCall::PushConstants {
                    layout,
                    stage_flags: *stage_flags,
                    offset: *offset,
                    values,
                });
            }
            Command::RenderPass(scope) => self.record_render_pass(name, scope)?,
            Command::NextSubpass { contents } => self.emit(NativeCall::NextSubpass {
                contents: *contents,
            }),
            Command::ExecuteCommands { command_buffers } => {
                if command_buffers
                    .iter()
                    .any(|b| b.level() != CommandBufferLevel::Secondary)
                {
                    return Err(Error::InvalidCommand {
                        command: name,
                        reason: "only secondary command buffers can be executed",
                    });
                }

                let mut handles = SmallVec::<[vk::CommandBuffer; 4]>::new();
                for command_buffer in command_buffers {
                    handles.push(self.resolve(name, command_buffer)?);

                    // Secondary buffers are never submitted directly, so their
                    // hooks have to run when the primary is.
                    if !command_buffer.pre_execute_hooks().is_empty() {
                        let secondary = Arc::clone(command_buffer);
                        self.add_pre_execute_hook(move |queue| secondary.prepare_submit(queue));
                    }
                }

                self.emit(NativeCall::ExecuteCommands {
                    command_buffers: &handles,
                });
            }
        }

        Ok(())
    }

    fn record_render_pass(&mut self, name: &'static str, scope: &RenderPassScope) -> Result<(), Error> {
        let render_pass = self.resolve(name, &scope.render_pass)?;
        let framebuffer = self.resolve(name, &scope.framebuffer)?;

        self.emit(NativeCall::BeginRenderPass {
            render_pass,
            framebuffer,
            render_area: scope.render_area,
            clear_values: &scope.clear_values,
            contents: scope.contents,
        });

        let mut pass = RenderPassGuard { context: self };
        pass.record_all(&scope.commands)
    }

    fn emit(&mut self, call: NativeCall<'_>) {
        log::trace!("Recording {}", call.name());
        self.recorder.emit(call);
    }

    /// Reads the handle behind `reference` and keeps the reference alive.
    fn resolve<T>(&mut self, command: &'static str, reference: &Arc<T>) -> Result<T::Handle, Error>
    where
        T: VkHandle + Send + Sync + ?Sized + 'static,
    {
        let handle = reference.vk_handle();
        if handle.as_raw() == 0 {
            return Err(Error::NullHandle {
                command,
                object_type: <T::Handle as Handle>::TYPE,
            });
        }

        self.references.add(Arc::clone(reference));
        Ok(handle)
    }

    fn resolve_all<T>(
        &mut self,
        command: &'static str,
        references: &[Arc<T>],
    ) -> Result<SmallVec<[T::Handle; 4]>, Error>
    where
        T: VkHandle + Send + Sync + ?Sized + 'static,
    {
        references
            .iter()
            .map(|reference| self.resolve(command, reference))
            .collect()
    }

    fn translate_buffer_barriers(
        &mut self,
        command: &'static str,
        barriers: &[BufferMemoryBarrier],
    ) -> Result<SmallVec<[vk::BufferMemoryBarrier<'static>; 4]>, Error> {
        barriers
            .iter()
            .map(|barrier| {
                let buffer = self.resolve(command, &barrier.buffer)?;
                Ok(vk::BufferMemoryBarrier::default()
                    .src_access_mask(barrier.src_access_mask)
                    .dst_access_mask(barrier.dst_access_mask)
                    .src_queue_family_index(barrier.src_queue_family_index)
                    .dst_queue_family_index(barrier.dst_queue_family_index)
                    .buffer(buffer)
                    .offset(barrier.offset)
                    .size(barrier.size))
            })
            .collect()
    }

    fn translate_image_barriers(
        &mut self,
        command: &'static str,
        barriers: &[ImageMemoryBarrier],
    ) -> Result<SmallVec<[vk::ImageMemoryBarrier<'static>; 4]>, Error> {
        barriers
            .iter()
            .map(|barrier| {
                let image = self.resolve(command, &barrier.image)?;
                Ok(vk::ImageMemoryBarrier::default()
                    .src_access_mask(barrier.src_access_mask)
                    .dst_access_mask(barrier.dst_access_mask)
                    .old_layout(barrier.old_layout)
                    .new_layout(barrier.new_layout)
                    .src_queue_family_index(barrier.src_queue_family_index)
                    .dst_queue_family_index(barrier.dst_queue_family_index)
                    .image(image)
                    .subresource_range(barrier.subresource_range))
            })
            .collect()
    }
}

fn translate_memory_barriers(barriers: &[MemoryBarrier]) -> SmallVec<[vk::MemoryBarrier<'static>; 4]> {
    barriers
        .iter()
        .map(|barrier| {
            vk::MemoryBarrier::default()
                .src_access_mask(barrier.src_access_mask)
                .dst_access_mask(barrier.dst_access_mask)
        })
        .collect()
}

fn validate_update(command: &'static str, dst_offset: vk::DeviceSize, data: &[u8]) -> Result<(), Error> {
    let reason = if data.is_empty() {
        "data must not be empty"
    } else if data.len() > MAX_UPDATE_BUFFER_SIZE {
        "data must be at most 65536 bytes"
    } else if data.len() % 4 != 0 {
        "data size must be a multiple of 4"
    } else if dst_offset % 4 != 0 {
        "destination offset must be a multiple of 4"
    } else {
        return Ok(());
    };

    Err(Error::InvalidCommand { command, reason })
}

fn validate_push_constants(command: &'static str, offset: u32, values: &[u8]) -> Result<(), Error> {
    let reason = if values.is_empty() {
        "values must not be empty"
    } else if values.len() % 4 != 0 {
        "values size must be a multiple of 4"
    } else if offset % 4 != 0 {
        "offset must be a multiple of 4"
    } else {
        return Ok(());
    };

    Err(Error::InvalidCommand { command, reason })
}

/// Ends the render pass when dropped, including when a nested command failed.
struct RenderPassGuard<'c, 'r> {
    context: &'c mut RecordingContext<'r>,
}

impl<'r> Deref for RenderPassGuard<'_, 'r> {
    type Target = RecordingContext<'r>;

    fn deref(&self) -> &Self::Target {
        &*self.context
    }
}

impl DerefMut for RenderPassGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.context
    }
}

impl Drop for RenderPassGuard<'_, '_> {
    fn drop(&mut self) {
        self.context.emit(NativeCall::EndRenderPass);
    }
}
