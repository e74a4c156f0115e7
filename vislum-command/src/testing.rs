//! In-memory stand-ins for the device, pools and queues used by the tests.

use std::{
    marker::PhantomData,
    sync::{Arc, Mutex},
};

use ash::vk::{self, Handle};

use crate::{
    Error, Shared, VkHandle,
    command::{CommandBufferLevel, CommandRecorder, NativeCall, RawCommandPool},
    handle::Dealloc,
    queue::SubmissionQueue,
    vk_check,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records every handle it is asked to release.
#[derive(Default)]
pub struct CountingOwner {
    released: Mutex<Vec<u64>>,
}

impl CountingOwner {
    pub fn released(&self) -> Vec<u64> {
        self.released.lock().unwrap().clone()
    }
}

impl Dealloc<vk::Event> for CountingOwner {
    fn dealloc(&self, handle: vk::Event) {
        self.released.lock().unwrap().push(handle.as_raw());
    }
}

/// A resource with a fixed raw handle. A raw value of 0 is a null handle.
pub struct FakeResource<H> {
    raw: u64,
    _marker: PhantomData<fn() -> H>,
}

impl<H> FakeResource<H>
where
    H: Handle + Copy + 'static,
{
    pub fn shared(raw: u64) -> Shared<H> {
        Arc::new(Self {
            raw,
            _marker: PhantomData,
        })
    }
}

impl<H: Handle + Copy> VkHandle for FakeResource<H> {
    type Handle = H;

    fn vk_handle(&self) -> H {
        H::from_raw(self.raw)
    }
}

/// The inheritance parameters a recording was begun with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedInheritance {
    pub render_pass: u64,
    pub subpass: u32,
    pub framebuffer: u64,
    pub occlusion_query_enable: bool,
    pub query_flags: vk::QueryControlFlags,
    pub pipeline_statistics: vk::QueryPipelineStatisticFlags,
}

#[derive(Default)]
struct RecorderLog {
    calls: Vec<String>,
    begin_flags: Vec<vk::CommandBufferUsageFlags>,
    inheritance: Vec<Option<RecordedInheritance>>,
    fail_begin: Option<vk::Result>,
    fail_end: Option<vk::Result>,
}

/// A recorder that describes every call it receives as a string.
#[derive(Default)]
pub struct LoggingRecorder {
    log: Arc<Mutex<RecorderLog>>,
}

impl LoggingRecorder {
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }
}

fn describe(call: &NativeCall<'_>) -> String {
    match call {
        NativeCall::BindPipeline { pipeline, .. } => {
            format!("bind_pipeline({})", pipeline.as_raw())
        }
        NativeCall::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        } => format!("draw({vertex_count},{instance_count},{first_vertex},{first_instance})"),
        NativeCall::Dispatch {
            group_count_x,
            group_count_y,
            group_count_z,
        } => format!("dispatch({group_count_x},{group_count_y},{group_count_z})"),
        NativeCall::UpdateBuffer {
            dst_buffer,
            dst_offset,
            data,
        } => format!(
            "update_buffer({},{},{})",
            dst_buffer.as_raw(),
            dst_offset,
            data.len()
        ),
        NativeCall::PipelineBarrier {
            memory_barriers,
            buffer_memory_barriers,
            image_memory_barriers,
            ..
        } => format!(
            "pipeline_barrier({},{},{})",
            memory_barriers.len(),
            buffer_memory_barriers.len(),
            image_memory_barriers.len()
        ),
        NativeCall::BeginRenderPass {
            render_pass,
            framebuffer,
            ..
        } => format!(
            "begin_render_pass({},{})",
            render_pass.as_raw(),
            framebuffer.as_raw()
        ),
        NativeCall::EndRenderPass => "end_render_pass".to_string(),
        NativeCall::ExecuteCommands { command_buffers } => {
            let handles: Vec<String> = command_buffers
                .iter()
                .map(|b| b.as_raw().to_string())
                .collect();
            format!("execute_commands({})", handles.join(","))
        }
        other => other.name().to_string(),
    }
}

impl CommandRecorder for LoggingRecorder {
    fn begin(&mut self, begin_info: &vk::CommandBufferBeginInfo<'_>) -> Result<(), vk::Result> {
        let mut log = self.log.lock().unwrap();
        if let Some(result) = log.fail_begin {
            return Err(result);
        }

        log.calls.push("begin".to_string());
        log.begin_flags.push(begin_info.flags);

        // SAFETY: the pointer is either null or borrowed from the begin info.
        let inheritance = unsafe { begin_info.p_inheritance_info.as_ref() };
        log.inheritance.push(inheritance.map(|info| RecordedInheritance {
            render_pass: info.render_pass.as_raw(),
            subpass: info.subpass,
            framebuffer: info.framebuffer.as_raw(),
            occlusion_query_enable: info.occlusion_query_enable == vk::TRUE,
            query_flags: info.query_flags,
            pipeline_statistics: info.pipeline_statistics,
        }));
        Ok(())
    }

    fn end(&mut self) -> Result<(), vk::Result> {
        let mut log = self.log.lock().unwrap();
        log.calls.push("end".to_string());
        match log.fail_end {
            Some(result) => Err(result),
            None => Ok(()),
        }
    }

    fn emit(&mut self, call: NativeCall<'_>) {
        self.log.lock().unwrap().calls.push(describe(&call));
    }
}

#[derive(Default)]
struct PoolState {
    next_handle: u64,
    allocations: usize,
    freed: Vec<u64>,
    shortfall: usize,
    fail_allocation: Option<vk::Result>,
}

/// A command pool whose buffers record into a shared in-memory log.
#[derive(Default)]
pub struct FakePool {
    state: Mutex<PoolState>,
    log: Arc<Mutex<RecorderLog>>,
}

impl FakePool {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        let mut log = self.log.lock().unwrap();
        log.calls.clear();
        log.begin_flags.clear();
        log.inheritance.clear();
    }

    pub fn begin_flags(&self) -> Vec<vk::CommandBufferUsageFlags> {
        self.log.lock().unwrap().begin_flags.clone()
    }

    pub fn inheritance(&self) -> Vec<Option<RecordedInheritance>> {
        self.log.lock().unwrap().inheritance.clone()
    }

    pub fn fail_begin(&self, result: vk::Result) {
        self.log.lock().unwrap().fail_begin = Some(result);
    }

    pub fn fail_end(&self, result: vk::Result) {
        self.log.lock().unwrap().fail_end = Some(result);
    }

    /// Makes the next allocations return `missing` fewer buffers than asked.
    pub fn shortfall(&self, missing: usize) {
        self.state.lock().unwrap().shortfall = missing;
    }

    pub fn fail_allocation(&self, result: vk::Result) {
        self.state.lock().unwrap().fail_allocation = Some(result);
    }

    /// Number of native allocation calls made.
    pub fn allocations(&self) -> usize {
        self.state.lock().unwrap().allocations
    }

    pub fn freed(&self) -> Vec<u64> {
        self.state.lock().unwrap().freed.clone()
    }
}

impl Dealloc<vk::CommandBuffer> for FakePool {
    fn dealloc(&self, handle: vk::CommandBuffer) {
        self.state.lock().unwrap().freed.push(handle.as_raw());
    }
}

impl RawCommandPool for FakePool {
    fn allocate_raw(
        &self,
        _level: CommandBufferLevel,
        count: u32,
    ) -> Result<Vec<vk::CommandBuffer>, Error> {
        let mut state = self.state.lock().unwrap();
        state.allocations += 1;

        let result = match state.fail_allocation {
            Some(result) => Err(result),
            None => Ok(()),
        };
        vk_check!(result)?;

        let produced = (count as usize).saturating_sub(state.shortfall);
        let handles = (0..produced)
            .map(|_| {
                state.next_handle += 1;
                vk::CommandBuffer::from_raw(0x100 + state.next_handle)
            })
            .collect();
        Ok(handles)
    }

    fn recorder(&self, _buffer: vk::CommandBuffer) -> Box<dyn CommandRecorder + '_> {
        Box::new(LoggingRecorder {
            log: Arc::clone(&self.log),
        })
    }
}

pub struct FakeQueue {
    family_index: u32,
}

impl FakeQueue {
    pub fn new(family_index: u32) -> Self {
        Self { family_index }
    }
}

impl VkHandle for FakeQueue {
    type Handle = vk::Queue;

    fn vk_handle(&self) -> vk::Queue {
        vk::Queue::from_raw(0x51)
    }
}

impl SubmissionQueue for FakeQueue {
    fn family_index(&self) -> u32 {
        self.family_index
    }
}
