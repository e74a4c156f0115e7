use ash::vk;

/// A single native command, with every resource already resolved to its raw
/// handle.
pub enum NativeCall<'a> {
    BindPipeline {
        bind_point: vk::PipelineBindPoint,
        pipeline: vk::Pipeline,
    },
    SetViewport {
        first_viewport: u32,
        viewports: &'a [vk::Viewport],
    },
    SetScissor {
        first_scissor: u32,
        scissors: &'a [vk::Rect2D],
    },
    SetLineWidth {
        line_width: f32,
    },
    SetDepthBias {
        constant_factor: f32,
        clamp: f32,
        slope_factor: f32,
    },
    SetBlendConstants {
        blend_constants: &'a [f32; 4],
    },
    SetDepthBounds {
        min_depth_bounds: f32,
        max_depth_bounds: f32,
    },
    SetStencilCompareMask {
        face_mask: vk::StencilFaceFlags,
        compare_mask: u32,
    },
    SetStencilWriteMask {
        face_mask: vk::StencilFaceFlags,
        write_mask: u32,
    },
    SetStencilReference {
        face_mask: vk::StencilFaceFlags,
        reference: u32,
    },
    BindDescriptorSets {
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        descriptor_sets: &'a [vk::DescriptorSet],
        dynamic_offsets: &'a [u32],
    },
    BindIndexBuffer {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        index_type: vk::IndexType,
    },
    BindVertexBuffers {
        first_binding: u32,
        buffers: &'a [vk::Buffer],
        offsets: &'a [vk::DeviceSize],
    },
    Draw {
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    },
    DrawIndirect {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32,
    },
    DrawIndexedIndirect {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32,
    },
    Dispatch {
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    },
    DispatchIndirect {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
    },
    CopyBuffer {
        src_buffer: vk::Buffer,
        dst_buffer: vk::Buffer,
        regions: &'a [vk::BufferCopy],
    },
    CopyImage {
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        regions: &'a [vk::ImageCopy],
    },
    BlitImage {
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        regions: &'a [vk::ImageBlit],
        filter: vk::Filter,
    },
    CopyBufferToImage {
        src_buffer: vk::Buffer,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        regions: &'a [vk::BufferImageCopy],
    },
    CopyImageToBuffer {
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_buffer: vk::Buffer,
        regions: &'a [vk::BufferImageCopy],
    },
    UpdateBuffer {
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        data: &'a [u8],
    },
    FillBuffer {
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        size: vk::DeviceSize,
        data: u32,
    },
    ClearColorImage {
        image: vk::Image,
        image_layout: vk::ImageLayout,
        color: &'a vk::ClearColorValue,
        ranges: &'a [vk::ImageSubresourceRange],
    },
    ClearDepthStencilImage {
        image: vk::Image,
        image_layout: vk::ImageLayout,
        depth_stencil: &'a vk::ClearDepthStencilValue,
        ranges: &'a [vk::ImageSubresourceRange],
    },
    ClearAttachments {
        attachments: &'a [vk::ClearAttachment],
        rects: &'a [vk::ClearRect],
    },
    ResolveImage {
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        regions: &'a [vk::ImageResolve],
    },
    SetEvent {
        event: vk::Event,
        stage_mask: vk::PipelineStageFlags,
    },
    ResetEvent {
        event: vk::Event,
        stage_mask: vk::PipelineStageFlags,
    },
    WaitEvents {
        events: &'a [vk::Event],
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        memory_barriers: &'a [vk::MemoryBarrier<'a>],
        buffer_memory_barriers: &'a [vk::BufferMemoryBarrier<'a>],
        image_memory_barriers: &'a [vk::ImageMemoryBarrier<'a>],
    },
    PipelineBarrier {
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barriers: &'a [vk::MemoryBarrier<'a>],
        buffer_memory_barriers: &'a [vk::BufferMemoryBarrier<'a>],
        image_memory_barriers: &'a [vk::ImageMemoryBarrier<'a>],
    },
    BeginQuery {
        query_pool: vk::QueryPool,
        query: u32,
        flags: vk::QueryControlFlags,
    },
    EndQuery {
        query_pool: vk::QueryPool,
        query: u32,
    },
    ResetQueryPool {
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
    },
    WriteTimestamp {
        pipeline_stage: vk::PipelineStageFlags,
        query_pool: vk::QueryPool,
        query: u32,
    },
    CopyQueryPoolResults {
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        stride: vk::DeviceSize,
        flags: vk::QueryResultFlags,
    },
    PushConstants {
        layout: vk::PipelineLayout,
        stage_flags: vk::ShaderStageFlags,
        offset: u32,
        values: &'a [u8],
    },
    BeginRenderPass {
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        render_area: vk::Rect2D,
        clear_values: &'a [vk::ClearValue],
        contents: vk::SubpassContents,
    },
    NextSubpass {
        contents: vk::SubpassContents,
    },
    EndRenderPass,
    ExecuteCommands {
        command_buffers: &'a [vk::CommandBuffer],
    },
}

impl NativeCall<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            NativeCall::BindPipeline { .. } => "vkCmdBindPipeline",
            NativeCall::SetViewport { .. } => "vkCmdSetViewport",
            NativeCall::SetScissor { .. } => "vkCmdSetScissor",
            NativeCall::SetLineWidth { .. } => "vkCmdSetLineWidth",
            NativeCall::SetDepthBias { .. } => "vkCmdSetDepthBias",
            NativeCall::SetBlendConstants { .. } => "vkCmdSetBlendConstants",
            NativeCall::SetDepthBounds { .. } => "vkCmdSetDepthBounds",
            NativeCall::SetStencilCompareMask { .. } => "vkCmdSetStencilCompareMask",
            NativeCall::SetStencilWriteMask { .. } => "vkCmdSetStencilWriteMask",
            NativeCall::SetStencilReference { .. } => "vkCmdSetStencilReference",
            NativeCall::BindDescriptorSets { .. } => "vkCmdBindDescriptorSets",
            NativeCall::BindIndexBuffer { .. } => "vkCmdBindIndexBuffer",
            NativeCall::BindVertexBuffers { .. } => "vkCmdBindVertexBuffers",
            NativeCall::Draw { .. } => "vkCmdDraw",
            NativeCall::DrawIndexed { .. } => "vkCmdDrawIndexed",
            NativeCall::DrawIndirect { .. } => "vkCmdDrawIndirect",
            NativeCall::DrawIndexedIndirect { .. } => "vkCmdDrawIndexedIndirect",
            NativeCall::Dispatch { .. } => "vkCmdDispatch",
            NativeCall::DispatchIndirect { .. } => "vkCmdDispatchIndirect",
            NativeCall::CopyBuffer { .. } => "vkCmdCopyBuffer",
            NativeCall::CopyImage { .. } => "vkCmdCopyImage",
            NativeCall::BlitImage { .. } => "vkCmdBlitImage",
            NativeCall::CopyBufferToImage { .. } => "vkCmdCopyBufferToImage",
            NativeCall::CopyImageToBuffer { .. } => "vkCmdCopyImageToBuffer",
            NativeCall::UpdateBuffer { .. } => "vkCmdUpdateBuffer",
            NativeCall::FillBuffer { .. } => "vkCmdFillBuffer",
            NativeCall::ClearColorImage { .. } => "vkCmdClearColorImage",
            NativeCall::ClearDepthStencilImage { .. } => "vkCmdClearDepthStencilImage",
            NativeCall::ClearAttachments { .. } => "vkCmdClearAttachments",
            NativeCall::ResolveImage { .. } => "vkCmdResolveImage",
            NativeCall::SetEvent { .. } => "vkCmdSetEvent",
            NativeCall::ResetEvent { .. } => "vkCmdResetEvent",
            NativeCall::WaitEvents { .. } => "vkCmdWaitEvents",
            NativeCall::PipelineBarrier { .. } => "vkCmdPipelineBarrier",
            NativeCall::BeginQuery { .. } => "vkCmdBeginQuery",
            NativeCall::EndQuery { .. } => "vkCmdEndQuery",
            NativeCall::ResetQueryPool { .. } => "vkCmdResetQueryPool",
            NativeCall::WriteTimestamp { .. } => "vkCmdWriteTimestamp",
            NativeCall::CopyQueryPoolResults { .. } => "vkCmdCopyQueryPoolResults",
            NativeCall::PushConstants { .. } => "vkCmdPushConstants",
            NativeCall::BeginRenderPass { .. } => "vkCmdBeginRenderPass",
            NativeCall::NextSubpass { .. } => "vkCmdNextSubpass",
            NativeCall::EndRenderPass => "vkCmdEndRenderPass",
            NativeCall::ExecuteCommands { .. } => "vkCmdExecuteCommands",
        }
    }
}

/// Writes native commands into one command buffer.
pub trait CommandRecorder {
    fn begin(&mut self, begin_info: &vk::CommandBufferBeginInfo<'_>) -> Result<(), vk::Result>;

    fn end(&mut self) -> Result<(), vk::Result>;

    fn emit(&mut self, call: NativeCall<'_>);
}

/// Records into a command buffer through the device's function table.
pub struct AshRecorder<'d> {
    device: &'d ash::Device,
    buffer: vk::CommandBuffer,
}

impl<'d> AshRecorder<'d> {
    pub fn new(device: &'d ash::Device, buffer: vk::CommandBuffer) -> Self {
        Self { device, buffer }
    }
}

impl CommandRecorder for AshRecorder<'_> {
    fn begin(&mut self, begin_info: &vk::CommandBufferBeginInfo<'_>) -> Result<(), vk::Result> {
        unsafe { self.device.begin_command_buffer(self.buffer, begin_info) }
    }

    fn end(&mut self) -> Result<(), vk::Result> {
        unsafe { self.device.end_command_buffer(self.buffer) }
    }

    fn emit(&mut self, call: NativeCall<'_>) {
        let device = self.device;
        let cb = self.buffer;

        unsafe {
            match call {
                NativeCall::BindPipeline {
                    bind_point,
                    pipeline,
                } => device.cmd_bind_pipeline(cb, bind_point, pipeline),
                NativeCall::SetViewport {
                    first_viewport,
                    viewports,
                } => device.cmd_set_viewport(cb, first_viewport, viewports),
                NativeCall::SetScissor {
                    first_scissor,
                    scissors,
                } => device.cmd_set_scissor(cb, first_scissor, scissors),
                NativeCall::SetLineWidth { line_width } => device.cmd_set_line_width(cb, line_width),
                NativeCall::SetDepthBias {
                    constant_factor,
                    clamp,
                    slope_factor,
                } => device.cmd_set_depth_bias(cb, constant_factor, clamp, slope_factor),
                NativeCall::SetBlendConstants { blend_constants } => {
                    device.cmd_set_blend_constants(cb, blend_constants)
                }
                NativeCall::SetDepthBounds {
                    min_depth_bounds,
                    max_depth_bounds,
                } => device.cmd_set_depth_bounds(cb, min_depth_bounds, max_depth_bounds),
                NativeCall::SetStencilCompareMask {
                    face_mask,
                    compare_mask,
                } => device.cmd_set_stencil_compare_mask(cb, face_mask, compare_mask),
                NativeCall::SetStencilWriteMask {
                    face_mask,
                    write_mask,
                } => device.cmd_set_stencil_write_mask(cb, face_mask, write_mask),
                NativeCall::SetStencilReference {
                    face_mask,
                    reference,
                } => device.cmd_set_stencil_reference(cb, face_mask, reference),
                NativeCall::BindDescriptorSets {
                    bind_point,
                    layout,
                    first_set,
                    descriptor_sets,
                    dynamic_offsets,
                } => device.cmd_bind_descriptor_sets(
                    cb,
                    bind_point,
                    layout,
                    first_set,
                    descriptor_sets,
                    dynamic_offsets,
                ),
                NativeCall::BindIndexBuffer {
                    buffer,
                    offset,
                    index_type,
                } => device.cmd_bind_index_buffer(cb, buffer, offset, index_type),
                NativeCall::BindVertexBuffers {
                    first_binding,
                    buffers,
                    offsets,
                } => device.cmd_bind_vertex_buffers(cb, first_binding, buffers, offsets),
                NativeCall::Draw {
                    vertex_count,
                    instance_count,
                    first_vertex,
                    first_instance,
                } => device.cmd_draw(cb, vertex_count, instance_count, first_vertex, first_instance),
                NativeCall::DrawIndexed {
                    index_count,
                    instance_count,
                    first_index,
                    vertex_offset,
                    first_instance,
                } => device.cmd_draw_indexed(
                    cb,
                    index_count,
                    instance_count,
                    first_index,
                    vertex_offset,
                    first_instance,
                ),
                NativeCall::DrawIndirect {
                    buffer,
                    offset,
                    draw_count,
                    stride,
                } => device.cmd_draw_indirect(cb, buffer, offset, draw_count, stride),
                NativeCall::DrawIndexedIndirect {
                    buffer,
                    offset,
                    draw_count,
                    stride,
                } => device.cmd_draw_indexed_indirect(cb, buffer, offset, draw_count, stride),
                NativeCall::Dispatch {
                    group_count_x,
                    group_count_y,
                    group_count_z,
                } => device.cmd_dispatch(cb, group_count_x, group_count_y, group_count_z),
                NativeCall::DispatchIndirect { buffer, offset } => {
                    device.cmd_dispatch_indirect(cb, buffer, offset)
                }
                NativeCall::CopyBuffer {
                    src_buffer,
                    dst_buffer,
                    regions,
                } => device.cmd_copy_buffer(cb, src_buffer, dst_buffer, regions),
                NativeCall::CopyImage {
                    src_image,
                    src_image_layout,
                    dst_image,
                    dst_image_layout,
                    regions,
                } => device.cmd_copy_image(
                    cb,
                    src_image,
                    src_image_layout,
                    dst_image,
                    dst_image_layout,
                    regions,
                ),
                NativeCall::BlitImage {
                    src_image,
                    src_image_layout,
                    dst_image,
                    dst_image_layout,
                    regions,
                    filter,
                } => device.cmd_blit_image(
                    cb,
                    src_image,
                    src_image_layout,
                    dst_image,
                    dst_image_layout,
                    regions,
                    filter,
                ),
                NativeCall::CopyBufferToImage {
                    src_buffer,
                    dst_image,
                    dst_image_layout,
                    regions,
                } => device.cmd_copy_buffer_to_image(
                    cb,
                    src_buffer,
                    dst_image,
                    dst_image_layout,
                    regions,
                ),
                NativeCall::CopyImageToBuffer {
                    src_image,
                    src_image_layout,
                    dst_buffer,
                    regions,
                } => device.cmd_copy_image_to_buffer(
                    cb,
                    src_image,
                    src_image_layout,
                    dst_buffer,
                    regions,
                ),
                NativeCall::UpdateBuffer {
                    dst_buffer,
                    dst_offset,
                    data,
                } => device.cmd_update_buffer(cb, dst_buffer, dst_offset, data),
                NativeCall::FillBuffer {
                    dst_buffer,
                    dst_offset,
                    size,
                    data,
                } => device.cmd_fill_buffer(cb, dst_buffer, dst_offset, size, data),
                NativeCall::ClearColorImage {
                    image,
                    image_layout,
                    color,
                    ranges,
                } => device.cmd_clear_color_image(cb, image, image_layout, color, ranges),
                NativeCall::ClearDepthStencilImage {
                    image,
                    image_layout,
                    depth_stencil,
                    ranges,
                } => device.cmd_clear_depth_stencil_image(
                    cb,
                    image,
                    image_layout,
                    depth_stencil,
                    ranges,
                ),
                NativeCall::ClearAttachments { attachments, rects } => {
                    device.cmd_clear_attachments(cb, attachments, rects)
                }
                NativeCall::ResolveImage {
                    src_image,
                    src_image_layout,
                    dst_image,
                    dst_image_layout,
                    regions,
                } => device.cmd_resolve_image(
                    cb,
                    src_image,
                    src_image_layout,
                    dst_image,
                    dst_image_layout,
                    regions,
                ),
                NativeCall::SetEvent { event, stage_mask } => {
                    device.cmd_set_event(cb, event, stage_mask)
                }
                NativeCall::ResetEvent { event, stage_mask } => {
                    device.cmd_reset_event(cb, event, stage_mask)
                }
                NativeCall::WaitEvents {
                    events,
                    src_stage_mask,
                    dst_stage_mask,
                    memory_barriers,
                    buffer_memory_barriers,
                    image_memory_barriers,
                } => device.cmd_wait_events(
                    cb,
                    events,
                    src_stage_mask,
                    dst_stage_mask,
                    memory_barriers,
                    buffer_memory_barriers,
                    image_memory_barriers,
                ),
                NativeCall::PipelineBarrier {
                    src_stage_mask,
                    dst_stage_mask,
                    dependency_flags,
                    memory_barriers,
                    buffer_memory_barriers,
                    image_memory_barriers,
                } => device.cmd_pipeline_barrier(
                    cb,
                    src_stage_mask,
                    dst_stage_mask,
                    dependency_flags,
                    memory_barriers,
                    buffer_memory_barriers,
                    image_memory_barriers,
                ),
                NativeCall::BeginQuery {
                    query_pool,
                    query,
                    flags,
                } => device.cmd_begin_query(cb, query_pool, query, flags),
                NativeCall::EndQuery { query_pool, query } => {
                    device.cmd_end_query(cb, query_pool, query)
                }
                NativeCall::ResetQueryPool {
                    query_pool,
                    first_query,
                    query_count,
                } => device.cmd_reset_query_pool(cb, query_pool, first_query, query_count),
                NativeCall::WriteTimestamp {
                    pipeline_stage,
                    query_pool,
                    query,
                } => device.cmd_write_timestamp(cb, pipeline_stage, query_pool, query),
                NativeCall::CopyQueryPoolResults {
                    query_pool,
                    first_query,
                    query_count,
                    dst_buffer,
                    dst_offset,
                    stride,
                    flags,
                } => device.cmd_copy_query_pool_results(
                    cb,
                    query_pool,
                    first_query,
                    query_count,
                    dst_buffer,
                    dst_offset,
                    stride,
                    flags,
                ),
                NativeCall::PushConstants {
                    layout,
                    stage_flags,
                    offset,
                    values,
                } => device.cmd_push_constants(cb, layout, stage_flags, offset, values),
                NativeCall::BeginRenderPass {
                    render_pass,
                    framebuffer,
                    render_area,
                    clear_values,
                    contents,
                } => {
                    let begin_info = vk::RenderPassBeginInfo::default()
                        .render_pass(render_pass)
                        .framebuffer(framebuffer)
                        .render_area(render_area)
                        .clear_values(clear_values);

                    device.cmd_begin_render_pass(cb, &begin_info, contents)
                }
                NativeCall::NextSubpass { contents } => device.cmd_next_subpass(cb, contents),
                NativeCall::EndRenderPass => device.cmd_end_render_pass(cb),
                NativeCall::ExecuteCommands { command_buffers } => {
                    device.cmd_execute_commands(cb, command_buffers)
                }
            }
        }
    }
}
