use std::sync::Arc;

use ash::vk;

use crate::{Shared, command::CommandBuffer, vk_enum};

bitflags::bitflags! {
    /// How a command buffer will be used once compiled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandBufferUsage: u8 {
        /// The buffer is submitted once and then recompiled.
        const ONE_TIME_SUBMIT = 1 << 0;
        /// A secondary buffer that is executed entirely inside a render pass.
        const RENDER_PASS_CONTINUE = 1 << 1;
        /// The buffer may be pending on several queues at once.
        const SIMULTANEOUS_USE = 1 << 2;
    }
}

impl CommandBufferUsage {
    pub fn to_vk(&self) -> vk::CommandBufferUsageFlags {
        let mut flags = vk::CommandBufferUsageFlags::empty();
        if self.contains(CommandBufferUsage::ONE_TIME_SUBMIT) {
            flags |= vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT;
        }
        if self.contains(CommandBufferUsage::RENDER_PASS_CONTINUE) {
            flags |= vk::CommandBufferUsageFlags::RENDER_PASS_CONTINUE;
        }
        if self.contains(CommandBufferUsage::SIMULTANEOUS_USE) {
            flags |= vk::CommandBufferUsageFlags::SIMULTANEOUS_USE;
        }

        flags
    }
}

vk_enum! {
    pub enum CommandBufferLevel: vk::CommandBufferLevel {
        Primary = PRIMARY,
        Secondary = SECONDARY,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBarrier {
    pub src_access_mask: vk::AccessFlags,
    pub dst_access_mask: vk::AccessFlags,
}

#[derive(Clone)]
pub struct BufferMemoryBarrier {
    pub src_access_mask: vk::AccessFlags,
    pub dst_access_mask: vk::AccessFlags,
    pub src_queue_family_index: u32,
    pub dst_queue_family_index: u32,
    pub buffer: Shared<vk::Buffer>,
    pub offset: vk::DeviceSize,
    pub size: vk::DeviceSize,
}

impl BufferMemoryBarrier {
    /// A barrier over the whole buffer with no queue family transfer.
    pub fn new(
        src_access_mask: vk::AccessFlags,
        dst_access_mask: vk::AccessFlags,
        buffer: Shared<vk::Buffer>,
    ) -> Self {
        Self {
            src_access_mask,
            dst_access_mask,
            src_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
            dst_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
            buffer,
            offset: 0,
            size: vk::WHOLE_SIZE,
        }
    }
}

#[derive(Clone)]
pub struct ImageMemoryBarrier {
    pub src_access_mask: vk::AccessFlags,
    pub dst_access_mask: vk::AccessFlags,
    pub old_layout: vk::ImageLayout,
    pub new_layout: vk::ImageLayout,
    pub src_queue_family_index: u32,
    pub dst_queue_family_index: u32,
    pub image: Shared<vk::Image>,
    pub subresource_range: vk::ImageSubresourceRange,
}

impl ImageMemoryBarrier {
    /// A layout transition with no queue family transfer.
    pub fn new(
        src_access_mask: vk::AccessFlags,
        dst_access_mask: vk::AccessFlags,
        old_layout: vk::ImageLayout,
        new_layout: vk::ImageLayout,
        image: Shared<vk::Image>,
        subresource_range: vk::ImageSubresourceRange,
    ) -> Self {
        Self {
            src_access_mask,
            dst_access_mask,
            old_layout,
            new_layout,
            src_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
            dst_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
            image,
            subresource_range,
        }
    }
}

/// A render pass instance and the commands recorded inside it.
#[derive(Clone)]
pub struct RenderPassScope {
    pub render_pass: Shared<vk::RenderPass>,
    pub framebuffer: Shared<vk::Framebuffer>,
    pub render_area: vk::Rect2D,
    pub clear_values: Vec<vk::ClearValue>,
    pub contents: vk::SubpassContents,
    pub commands: Vec<Command>,
}

/// A single recordable command.
///
/// Resources are held through [`Shared`] references. Their handles are read
/// when the command is recorded, and the references are kept alive by the
/// command buffer the command was compiled into.
#[derive(Clone)]
pub enum Command {
    BindPipeline {
        bind_point: vk::PipelineBindPoint,
        pipeline: Shared<vk::Pipeline>,
    },
    SetViewport {
        first_viewport: u32,
        viewports: Vec<vk::Viewport>,
    },
    SetScissor {
        first_scissor: u32,
        scissors: Vec<vk::Rect2D>,
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
        blend_constants: [f32; 4],
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
        layout: Shared<vk::PipelineLayout>,
        first_set: u32,
        descriptor_sets: Vec<Shared<vk::DescriptorSet>>,
        dynamic_offsets: Vec<u32>,
    },
    BindIndexBuffer {
        buffer: Shared<vk::Buffer>,
        offset: vk::DeviceSize,
        index_type: vk::IndexType,
    },
    BindVertexBuffers {
        first_binding: u32,
        buffers: Vec<Shared<vk::Buffer>>,
        offsets: Vec<vk::DeviceSize>,
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
        buffer: Shared<vk::Buffer>,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32,
    },
    DrawIndexedIndirect {
        buffer: Shared<vk::Buffer>,
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
        buffer: Shared<vk::Buffer>,
        offset: vk::DeviceSize,
    },
    CopyBuffer {
        src_buffer: Shared<vk::Buffer>,
        dst_buffer: Shared<vk::Buffer>,
        regions: Vec<vk::BufferCopy>,
    },
    CopyImage {
        src_image: Shared<vk::Image>,
        src_image_layout: vk::ImageLayout,
        dst_image: Shared<vk::Image>,
        dst_image_layout: vk::ImageLayout,
        regions: Vec<vk::ImageCopy>,
    },
    BlitImage {
        src_image: Shared<vk::Image>,
        src_image_layout: vk::ImageLayout,
        dst_image: Shared<vk::Image>,
        dst_image_layout: vk::ImageLayout,
        regions: Vec<vk::ImageBlit>,
        filter: vk::Filter,
    },
    CopyBufferToImage {
        src_buffer: Shared<vk::Buffer>,
        dst_image: Shared<vk::Image>,
        dst_image_layout: vk::ImageLayout,
        regions: Vec<vk::BufferImageCopy>,
    },
    CopyImageToBuffer {
        src_image: Shared<vk::Image>,
        src_image_layout: vk::ImageLayout,
        dst_buffer: Shared<vk::Buffer>,
        regions: Vec<vk::BufferImageCopy>,
    },
    /// Inline buffer update. `data` must be a non-empty multiple of 4 bytes,
    /// at most 65536 bytes long.
    UpdateBuffer {
        dst_buffer: Shared<vk::Buffer>,
        dst_offset: vk::DeviceSize,
        data: Vec<u8>,
    },
    FillBuffer {
        dst_buffer: Shared<vk::Buffer>,
        dst_offset: vk::DeviceSize,
        size: vk::DeviceSize,
        data: u32,
    },
    ClearColorImage {
        image: Shared<vk::Image>,
        image_layout: vk::ImageLayout,
        color: vk::ClearColorValue,
        ranges: Vec<vk::ImageSubresourceRange>,
    },
    ClearDepthStencilImage {
        image: Shared<vk::Image>,
        image_layout: vk::ImageLayout,
        depth_stencil: vk::ClearDepthStencilValue,
        ranges: Vec<vk::ImageSubresourceRange>,
    },
    ClearAttachments {
        attachments: Vec<vk::ClearAttachment>,
        rects: Vec<vk::ClearRect>,
    },
    ResolveImage {
        src_image: Shared<vk::Image>,
        src_image_layout: vk::ImageLayout,
        dst_image: Shared<vk::Image>,
        dst_image_layout: vk::ImageLayout,
        regions: Vec<vk::ImageResolve>,
    },
    SetEvent {
        event: Shared<vk::Event>,
        stage_mask: vk::PipelineStageFlags,
    },
    ResetEvent {
        event: Shared<vk::Event>,
        stage_mask: vk::PipelineStageFlags,
    },
    WaitEvents {
        events: Vec<Shared<vk::Event>>,
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        memory_barriers: Vec<MemoryBarrier>,
        buffer_memory_barriers: Vec<BufferMemoryBarrier>,
        image_memory_barriers: Vec<ImageMemoryBarrier>,
    },
    PipelineBarrier {
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barriers: Vec<MemoryBarrier>,
        buffer_memory_barriers: Vec<BufferMemoryBarrier>,
        image_memory_barriers: Vec<ImageMemoryBarrier>,
    },
    BeginQuery {
        query_pool: Shared<vk::QueryPool>,
        query: u32,
        flags: vk::QueryControlFlags,
    },
    EndQuery {
        query_pool: Shared<vk::QueryPool>,
        query: u32,
    },
    ResetQueryPool {
        query_pool: Shared<vk::QueryPool>,
        first_query: u32,
        query_count: u32,
    },
    WriteTimestamp {
        pipeline_stage: vk::PipelineStageFlags,
        query_pool: Shared<vk::QueryPool>,
        query: u32,
    },
    CopyQueryPoolResults {
        query_pool: Shared<vk::QueryPool>,
        first_query: u32,
        query_count: u32,
        dst_buffer: Shared<vk::Buffer>,
        dst_offset: vk::DeviceSize,
        stride: vk::DeviceSize,
        flags: vk::QueryResultFlags,
    },
    PushConstants {
        layout: Shared<vk::PipelineLayout>,
        stage_flags: vk::ShaderStageFlags,
        offset: u32,
        values: Vec<u8>,
    },
    RenderPass(RenderPassScope),
    NextSubpass {
        contents: vk::SubpassContents,
    },
    ExecuteCommands {
        command_buffers: Vec<Arc<CommandBuffer>>,
    },
}

impl Command {
    pub fn bind_pipeline(bind_point: vk::PipelineBindPoint, pipeline: Shared<vk::Pipeline>) -> Self {
        Command::BindPipeline {
            bind_point,
            pipeline,
        }
    }

    pub fn draw(vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) -> Self {
        Command::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        }
    }

    pub fn dispatch(group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Self {
        Command::Dispatch {
            group_count_x,
            group_count_y,
            group_count_z,
        }
    }

    pub fn render_pass(
        render_pass: Shared<vk::RenderPass>,
        framebuffer: Shared<vk::Framebuffer>,
        render_area: vk::Rect2D,
        clear_values: Vec<vk::ClearValue>,
        contents: vk::SubpassContents,
        commands: Vec<Command>,
    ) -> Self {
        Command::RenderPass(RenderPassScope {
            render_pass,
            framebuffer,
            render_area,
            clear_values,
            contents,
            commands,
        })
    }

    pub fn execute_commands(command_buffers: Vec<Arc<CommandBuffer>>) -> Self {
        Command::ExecuteCommands { command_buffers }
    }

    /// The name of the native command this records.
    pub fn name(&self) -> &'static str {
        match self {
            Command::BindPipeline { .. } => "bind_pipeline",
            Command::SetViewport { .. } => "set_viewport",
            Command::SetScissor { .. } => "set_scissor",
            Command::SetLineWidth { .. } => "set_line_width",
            Command::SetDepthBias { .. } => "set_depth_bias",
            Command::SetBlendConstants { .. } => "set_blend_constants",
            Command::SetDepthBounds { .. } => "set_depth_bounds",
            Command::SetStencilCompareMask { .. } => "set_stencil_compare_mask",
            Command::SetStencilWriteMask { .. } => "set_stencil_write_mask",
            Command::SetStencilReference { .. } => "set_stencil_reference",
            Command::BindDescriptorSets { .. } => "bind_descriptor_sets",
            Command::BindIndexBuffer { .. } => "bind_index_buffer",
            Command::BindVertexBuffers { .. } => "bind_vertex_buffers",
            Command::Draw { .. } => "draw",
            Command::DrawIndexed { .. } => "draw_indexed",
            Command::DrawIndirect { .. } => "draw_indirect",
            Command::DrawIndexedIndirect { .. } => "draw_indexed_indirect",
            Command::Dispatch { .. } => "dispatch",
            Command::DispatchIndirect { .. } => "dispatch_indirect",
            Command::CopyBuffer { .. } => "copy_buffer",
            Command::CopyImage { .. } => "copy_image",
            Command::BlitImage { .. } => "blit_image",
            Command::CopyBufferToImage { .. } => "copy_buffer_to_image",
            Command::CopyImageToBuffer { .. } => "copy_image_to_buffer",
            Command::UpdateBuffer { .. } => "update_buffer",
            Command::FillBuffer { .. } => "fill_buffer",
            Command::ClearColorImage { .. } => "clear_color_image",
            Command::ClearDepthStencilImage { .. } => "clear_depth_stencil_image",
            Command::ClearAttachments { .. } => "clear_attachments",
            Command::ResolveImage { .. } => "resolve_image",
            Command::SetEvent { .. } => "set_event",
            Command::ResetEvent { .. } => "reset_event",
            Command::WaitEvents { .. } => "wait_events",
            Command::PipelineBarrier { .. } => "pipeline_barrier",
            Command::BeginQuery { .. } => "begin_query",
            Command::EndQuery { .. } => "end_query",
            Command::ResetQueryPool { .. } => "reset_query_pool",
            Command::WriteTimestamp { .. } => "write_timestamp",
            Command::CopyQueryPoolResults { .. } => "copy_query_pool_results",
            Command::PushConstants { .. } => "push_constants",
            Command::RenderPass(_) => "render_pass",
            Command::NextSubpass { .. } => "next_subpass",
            Command::ExecuteCommands { .. } => "execute_commands",
        }
    }
}

/// A clear value for a color attachment.
pub fn clear_color(color: vk::ClearColorValue) -> vk::ClearValue {
    vk::ClearValue { color }
}

/// A clear value for a depth/stencil attachment.
pub fn clear_depth_stencil(depth_stencil: vk::ClearDepthStencilValue) -> vk::ClearValue {
    vk::ClearValue { depth_stencil }
}
