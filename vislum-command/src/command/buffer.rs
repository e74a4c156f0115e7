use std::fmt;

use ash::vk;

use crate::{
    Error, Shared, VkHandle,
    handle::OwnedHandle,
    hook::PreExecuteHooks,
    queue::SubmissionQueue,
    references::ReferenceContainer,
    vk_check,
};

use super::{
    dispatch::RecordingContext,
    native::CommandRecorder,
    pool::RawCommandPool,
    types::{Command, CommandBufferLevel, CommandBufferUsage},
};

/// Parameters used to begin recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordingInfo {
    pub usage: CommandBufferUsage,
    /// Whether the buffer may be executed while an occlusion query is active.
    pub occlusion_query_enable: bool,
    pub query_flags: vk::QueryControlFlags,
    pub pipeline_statistics: vk::QueryPipelineStatisticFlags,
}

impl RecordingInfo {
    pub fn new(usage: CommandBufferUsage) -> Self {
        Self {
            usage,
            ..Default::default()
        }
    }
}

/// The render pass state a secondary buffer continues.
#[derive(Clone)]
pub struct Inheritance {
    pub render_pass: Shared<vk::RenderPass>,
    pub subpass: u32,
    pub framebuffer: Shared<vk::Framebuffer>,
}

/// A command buffer allocated from a pool.
///
/// The buffer is filled by [`CommandBuffer::compile`] and may be recompiled any
/// number of times. It keeps every resource its last successful compilation
/// referenced alive, and is freed back to its pool when dropped.
pub struct CommandBuffer {
    handle: OwnedHandle<vk::CommandBuffer, dyn RawCommandPool>,
    level: CommandBufferLevel,
    references: ReferenceContainer,
    pre_execute_hooks: PreExecuteHooks,
}

impl VkHandle for CommandBuffer {
    type Handle = vk::CommandBuffer;

    #[inline]
    fn vk_handle(&self) -> Self::Handle {
        self.handle.raw()
    }
}

impl fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("handle", &self.handle)
            .field("level", &self.level)
            .field("references", &self.references.len())
            .field("pre_execute_hooks", &self.pre_execute_hooks.len())
            .finish()
    }
}

impl CommandBuffer {
    pub(crate) fn new(
        handle: OwnedHandle<vk::CommandBuffer, dyn RawCommandPool>,
        level: CommandBufferLevel,
    ) -> Self {
        Self {
            handle,
            level,
            references: ReferenceContainer::new(),
            pre_execute_hooks: PreExecuteHooks::new(),
        }
    }

    #[inline]
    pub fn level(&self) -> CommandBufferLevel {
        self.level
    }

    /// The resources referenced by the last successful compilation.
    #[inline]
    pub fn references(&self) -> &ReferenceContainer {
        &self.references
    }

    /// The hooks registered by the last successful compilation.
    #[inline]
    pub fn pre_execute_hooks(&self) -> &PreExecuteHooks {
        &self.pre_execute_hooks
    }

    /// Records `commands` into the buffer, in order.
    ///
    /// On success the resources and hooks of the previous compilation are
    /// released and replaced. On failure they are left untouched, while the
    /// native buffer contents are unspecified until the next successful
    /// compilation.
    pub fn compile(&mut self, info: &RecordingInfo, commands: &[Command]) -> Result<(), Error> {
        self.compile_with(info, commands, |_| Ok(()))
    }

    /// Like [`CommandBuffer::compile`], then hands the recording context to
    /// `extend` before the buffer is ended.
    ///
    /// `extend` may record more commands or register pre-execute hooks with
    /// [`RecordingContext::add_pre_execute_hook`]. An error from it fails the
    /// compilation.
    pub fn compile_with<F>(
        &mut self,
        info: &RecordingInfo,
        commands: &[Command],
        extend: F,
    ) -> Result<(), Error>
    where
        F: FnOnce(&mut RecordingContext<'_>) -> Result<(), Error>,
    {
        let inheritance_info = inheritance_info(info);
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(info.usage.to_vk())
            .inheritance_info(&inheritance_info);

        self.record(&begin_info, ReferenceContainer::new(), commands, extend)
    }

    /// Records `commands` into a secondary buffer that continues a render pass.
    ///
    /// The render pass and framebuffer are kept alive alongside the resources
    /// the commands reference.
    pub fn compile_in_render_pass(
        &mut self,
        info: &RecordingInfo,
        inheritance: &Inheritance,
        commands: &[Command],
    ) -> Result<(), Error> {
        let render_pass = resolve_inherited(&inheritance.render_pass)?;
        let framebuffer = resolve_inherited(&inheritance.framebuffer)?;

        let inheritance_info = inheritance_info(info)
            .render_pass(render_pass)
            .subpass(inheritance.subpass)
            .framebuffer(framebuffer);
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(info.usage.to_vk())
            .inheritance_info(&inheritance_info);

        let mut references = ReferenceContainer::new();
        references.add(inheritance.render_pass.clone());
        references.add(inheritance.framebuffer.clone());

        self.record(&begin_info, references, commands, |_| Ok(()))
    }

    /// Runs the pre-execute hooks against the queue this buffer is about to be
    /// submitted to.
    pub fn prepare_submit(&self, queue: &(dyn SubmissionQueue + 'static)) -> Result<(), Error> {
        self.pre_execute_hooks.invoke(queue)
    }

    fn record<F>(
        &mut self,
        begin_info: &vk::CommandBufferBeginInfo<'_>,
        mut references: ReferenceContainer,
        commands: &[Command],
        extend: F,
    ) -> Result<(), Error>
    where
        F: FnOnce(&mut RecordingContext<'_>) -> Result<(), Error>,
    {
        let raw = self.handle.raw();
        let mut recorder = self.handle.owner().recorder(raw);
        let mut scope = RecordingScope::begin(recorder.as_mut(), begin_info)?;

        let mut context = RecordingContext::new(scope.recorder());
        context.references_mut().append(&mut references);
        context.record_all(commands)?;
        extend(&mut context)?;
        let (references, pre_execute_hooks) = context.finish();

        scope.end()?;

        log::debug!(
            "Compiled {:?} with {} command(s), {} reference(s), {} pre-execute hook(s)",
            raw,
            commands.len(),
            references.len(),
            pre_execute_hooks.len()
        );

        self.references = references;
        self.pre_execute_hooks = pre_execute_hooks;
        Ok(())
    }
}

fn inheritance_info(info: &RecordingInfo) -> vk::CommandBufferInheritanceInfo<'static> {
    vk::CommandBufferInheritanceInfo::default()
        .occlusion_query_enable(info.occlusion_query_enable)
        .query_flags(info.query_flags)
        .pipeline_statistics(info.pipeline_statistics)
}

fn resolve_inherited<H>(reference: &Shared<H>) -> Result<H, Error>
where
    H: vk::Handle + Copy + 'static,
{
    let handle = reference.vk_handle();
    if handle.as_raw() == 0 {
        return Err(Error::NullHandle {
            command: "begin",
            object_type: H::TYPE,
        });
    }

    Ok(handle)
}

/// An open recording session on a command buffer.
///
/// The buffer is ended by [`RecordingScope::end`], or when the scope is dropped
/// on an error path.
struct RecordingScope<'s> {
    recorder: &'s mut dyn CommandRecorder,
    open: bool,
}

impl<'s> RecordingScope<'s> {
    fn begin(
        recorder: &'s mut dyn CommandRecorder,
        begin_info: &vk::CommandBufferBeginInfo<'_>,
    ) -> Result<Self, Error> {
        vk_check!(recorder.begin(begin_info))?;
        Ok(Self {
            recorder,
            open: true,
        })
    }

    fn recorder(&mut self) -> &mut dyn CommandRecorder {
        &mut *self.recorder
    }

    fn end(mut self) -> Result<(), Error> {
        self.open = false;
        vk_check!(self.recorder.end())?;
        Ok(())
    }
}

impl Drop for RecordingScope<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }

        if let Err(e) = self.recorder.end() {
            log::warn!(
                "Failed to end command buffer after a recording error: {}",
                crate::vk_result_name(e)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        command::{allocate, types::clear_color},
        testing::{FakePool, FakeQueue, FakeResource, RecordedInheritance, init_logging},
    };

    fn primary(pool: &Arc<FakePool>) -> CommandBuffer {
        allocate(pool, CommandBufferLevel::Primary, 1)
            .unwrap()
            .pop()
            .unwrap()
    }

    fn secondary(pool: &Arc<FakePool>) -> CommandBuffer {
        allocate(pool, CommandBufferLevel::Secondary, 1)
            .unwrap()
            .pop()
            .unwrap()
    }

    fn pipeline(raw: u64) -> Shared<vk::Pipeline> {
        FakeResource::shared(raw)
    }

    #[test]
    fn compiles_bind_and_draw() {
        init_logging();
        let pool = FakePool::new();
        let mut buffer = primary(&pool);
        let pipeline = pipeline(5);

        buffer
            .compile(
                &RecordingInfo::new(CommandBufferUsage::ONE_TIME_SUBMIT),
                &[
                    Command::bind_pipeline(vk::PipelineBindPoint::GRAPHICS, Arc::clone(&pipeline)),
                    Command::draw(3, 1, 0, 0),
                ],
            )
            .unwrap();

        assert_eq!(
            pool.calls(),
            ["begin", "bind_pipeline(5)", "draw(3,1,0,0)", "end"]
        );
        assert_eq!(pool.begin_flags(), [vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT]);
        assert_eq!(buffer.references().len(), 1);
        assert_eq!(Arc::strong_count(&pipeline), 2);
    }

    #[test]
    fn compile_passes_query_settings_without_a_render_pass() {
        let pool = FakePool::new();
        let mut buffer = secondary(&pool);

        buffer
            .compile(
                &RecordingInfo {
                    occlusion_query_enable: true,
                    query_flags: vk::QueryControlFlags::PRECISE,
                    pipeline_statistics: vk::QueryPipelineStatisticFlags::VERTEX_SHADER_INVOCATIONS,
                    ..RecordingInfo::default()
                },
                &[Command::dispatch(1, 1, 1)],
            )
            .unwrap();

        assert_eq!(
            pool.inheritance(),
            [Some(RecordedInheritance {
                render_pass: 0,
                subpass: 0,
                framebuffer: 0,
                occlusion_query_enable: true,
                query_flags: vk::QueryControlFlags::PRECISE,
                pipeline_statistics: vk::QueryPipelineStatisticFlags::VERTEX_SHADER_INVOCATIONS,
            })]
        );
    }

    #[test]
    fn compiles_a_render_pass() {
        init_logging();
        let pool = FakePool::new();
        let mut buffer = primary(&pool);

        buffer
            .compile(
                &RecordingInfo::default(),
                &[Command::render_pass(
                    FakeResource::shared(10),
                    FakeResource::shared(11),
                    vk::Rect2D::default(),
                    vec![clear_color(vk::ClearColorValue {
                        float32: [0.0, 0.0, 0.0, 1.0],
                    })],
                    vk::SubpassContents::INLINE,
                    vec![
                        Command::bind_pipeline(vk::PipelineBindPoint::GRAPHICS, pipeline(5)),
                        Command::draw(3, 1, 0, 0),
                    ],
                )],
            )
            .unwrap();

        assert_eq!(
            pool.calls(),
            [
                "begin",
                "begin_render_pass(10,11)",
                "bind_pipeline(5)",
                "draw(3,1,0,0)",
                "end_render_pass",
                "end",
            ]
        );
        assert_eq!(buffer.references().len(), 3);
    }

    #[test]
    fn render_pass_keeps_pass_and_framebuffer() {
        let pool = FakePool::new();
        let mut buffer = primary(&pool);
        let render_pass: Shared<vk::RenderPass> = FakeResource::shared(10);
        let framebuffer: Shared<vk::Framebuffer> = FakeResource::shared(11);

        buffer
            .compile(
                &RecordingInfo::default(),
                &[Command::render_pass(
                    Arc::clone(&render_pass),
                    Arc::clone(&framebuffer),
                    vk::Rect2D::default(),
                    Vec::new(),
                    vk::SubpassContents::INLINE,
                    vec![Command::draw(6, 1, 0, 0)],
                )],
            )
            .unwrap();

        assert_eq!(
            pool.calls(),
            [
                "begin",
                "begin_render_pass(10,11)",
                "draw(6,1,0,0)",
                "end_render_pass",
                "end",
            ]
        );
        assert_eq!(buffer.references().len(), 2);
        assert_eq!(Arc::strong_count(&render_pass), 2);
        assert_eq!(Arc::strong_count(&framebuffer), 2);
    }

    #[test]
    fn recompiling_releases_previous_references() {
        let pool = FakePool::new();
        let mut buffer = primary(&pool);
        let first = pipeline(5);
        let second = pipeline(6);

        buffer
            .compile(
                &RecordingInfo::default(),
                &[Command::bind_pipeline(vk::PipelineBindPoint::GRAPHICS, Arc::clone(&first))],
            )
            .unwrap();
        assert_eq!(Arc::strong_count(&first), 2);

        buffer
            .compile(
                &RecordingInfo::default(),
                &[Command::bind_pipeline(vk::PipelineBindPoint::GRAPHICS, Arc::clone(&second))],
            )
            .unwrap();
        assert_eq!(Arc::strong_count(&first), 1);
        assert_eq!(Arc::strong_count(&second), 2);

        drop(buffer);
        assert_eq!(Arc::strong_count(&second), 1);
    }

    #[test]
    fn failed_compile_keeps_previous_references_and_ends_the_buffer() {
        init_logging();
        let pool = FakePool::new();
        let mut buffer = primary(&pool);
        let kept = pipeline(5);

        buffer
            .compile(
                &RecordingInfo::default(),
                &[Command::bind_pipeline(vk::PipelineBindPoint::GRAPHICS, Arc::clone(&kept))],
            )
            .unwrap();
        pool.clear_calls();

        let err = buffer
            .compile(
                &RecordingInfo::default(),
                &[
                    Command::draw(3, 1, 0, 0),
                    Command::bind_pipeline(vk::PipelineBindPoint::GRAPHICS, pipeline(0)),
                    Command::draw(6, 1, 0, 0),
                ],
            )
            .unwrap_err();

        assert!(matches!(err, Error::NullHandle { .. }));
        assert_eq!(pool.calls(), ["begin", "draw(3,1,0,0)", "end"]);
        assert_eq!(buffer.references().len(), 1);
        assert_eq!(Arc::strong_count(&kept), 2);
    }

    #[test]
    fn nested_failure_closes_render_pass_then_buffer() {
        let pool = FakePool::new();
        let mut buffer = primary(&pool);

        let err = buffer
            .compile(
                &RecordingInfo::default(),
                &[Command::render_pass(
                    FakeResource::shared(10),
                    FakeResource::shared(11),
                    vk::Rect2D::default(),
                    Vec::new(),
                    vk::SubpassContents::INLINE,
                    vec![Command::bind_pipeline(vk::PipelineBindPoint::GRAPHICS, pipeline(0))],
                )],
            )
            .unwrap_err();

        assert!(matches!(err, Error::NullHandle { .. }));
        assert_eq!(
            pool.calls(),
            ["begin", "begin_render_pass(10,11)", "end_render_pass", "end"]
        );
        assert!(buffer.references().is_empty());
    }

    #[test]
    fn failing_end_is_reported() {
        let pool = FakePool::new();
        let mut buffer = primary(&pool);
        pool.fail_end(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);

        let err = buffer
            .compile(
                &RecordingInfo::default(),
                &[Command::bind_pipeline(vk::PipelineBindPoint::GRAPHICS, pipeline(5))],
            )
            .unwrap_err();

        assert_eq!(err.vk_result(), Some(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY));
        assert!(buffer.references().is_empty());
    }

    #[test]
    fn failing_begin_records_nothing() {
        let pool = FakePool::new();
        let mut buffer = primary(&pool);
        pool.fail_begin(vk::Result::ERROR_OUT_OF_HOST_MEMORY);

        let err = buffer
            .compile(&RecordingInfo::default(), &[Command::draw(3, 1, 0, 0)])
            .unwrap_err();

        assert_eq!(err.vk_result(), Some(vk::Result::ERROR_OUT_OF_HOST_MEMORY));
        assert!(pool.calls().is_empty());
    }

    #[test]
    fn render_pass_continuation_keeps_inherited_objects() {
        let pool = FakePool::new();
        let mut buffer = secondary(&pool);
        let render_pass: Shared<vk::RenderPass> = FakeResource::shared(10);
        let framebuffer: Shared<vk::Framebuffer> = FakeResource::shared(11);

        buffer
            .compile_in_render_pass(
                &RecordingInfo {
                    occlusion_query_enable: true,
                    query_flags: vk::QueryControlFlags::PRECISE,
                    ..RecordingInfo::new(CommandBufferUsage::RENDER_PASS_CONTINUE)
                },
                &Inheritance {
                    render_pass: Arc::clone(&render_pass),
                    subpass: 2,
                    framebuffer: Arc::clone(&framebuffer),
                },
                &[Command::draw(3, 1, 0, 0)],
            )
            .unwrap();

        assert_eq!(pool.calls(), ["begin", "draw(3,1,0,0)", "end"]);
        assert_eq!(
            pool.begin_flags(),
            [vk::CommandBufferUsageFlags::RENDER_PASS_CONTINUE]
        );
        assert_eq!(
            pool.inheritance(),
            [Some(RecordedInheritance {
                render_pass: 10,
                subpass: 2,
                framebuffer: 11,
                occlusion_query_enable: true,
                query_flags: vk::QueryControlFlags::PRECISE,
                pipeline_statistics: vk::QueryPipelineStatisticFlags::empty(),
            })]
        );
        assert_eq!(buffer.references().len(), 2);
        assert_eq!(Arc::strong_count(&render_pass), 2);
        assert_eq!(Arc::strong_count(&framebuffer), 2);
    }

    #[test]
    fn null_inherited_render_pass_is_rejected() {
        let pool = FakePool::new();
        let mut buffer = secondary(&pool);

        let err = buffer
            .compile_in_render_pass(
                &RecordingInfo::default(),
                &Inheritance {
                    render_pass: FakeResource::shared(0),
                    subpass: 0,
                    framebuffer: FakeResource::shared(11),
                },
                &[],
            )
            .unwrap_err();

        assert!(matches!(
            err,
            Error::NullHandle {
                object_type: vk::ObjectType::RENDER_PASS,
                ..
            }
        ));
        assert!(pool.calls().is_empty());
    }

    #[test]
    fn secondary_hooks_run_when_primary_is_submitted() {
        let pool = FakePool::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut inner = secondary(&pool);
        {
            let order = Arc::clone(&order);
            inner
                .compile_with(
                    &RecordingInfo::default(),
                    &[Command::draw(1, 1, 0, 0)],
                    move |context| {
                        context.add_pre_execute_hook(move |queue| {
                            order.lock().unwrap().push(queue.family_index());
                            Ok(())
                        });
                        Ok(())
                    },
                )
                .unwrap();
        }
        let inner = Arc::new(inner);

        let mut outer = primary(&pool);
        outer
            .compile(
                &RecordingInfo::default(),
                &[Command::execute_commands(vec![Arc::clone(&inner)])],
            )
            .unwrap();

        assert_eq!(outer.pre_execute_hooks().len(), 1);
        assert_eq!(outer.references().len(), 1);
        // One for the reference container, one for the forwarding hook.
        assert_eq!(Arc::strong_count(&inner), 3);

        outer.prepare_submit(&FakeQueue::new(3)).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![3]);
    }

    #[test]
    fn secondaries_without_hooks_add_none() {
        let pool = FakePool::new();
        let mut inner = secondary(&pool);
        inner
            .compile(&RecordingInfo::default(), &[Command::draw(1, 1, 0, 0)])
            .unwrap();
        let inner = Arc::new(inner);
        let raw = inner.vk_handle();

        let mut outer = primary(&pool);
        pool.clear_calls();
        outer
            .compile(
                &RecordingInfo::default(),
                &[Command::execute_commands(vec![Arc::clone(&inner), Arc::clone(&inner)])],
            )
            .unwrap();

        assert!(outer.pre_execute_hooks().is_empty());
        assert_eq!(
            pool.calls(),
            [
                "begin".to_string(),
                format!("execute_commands({0},{0})", vk::Handle::as_raw(raw)),
                "end".to_string(),
            ]
        );
    }

    #[test]
    fn executing_a_primary_is_rejected() {
        let pool = FakePool::new();
        let mut inner = primary(&pool);
        inner
            .compile(&RecordingInfo::default(), &[Command::draw(1, 1, 0, 0)])
            .unwrap();
        let inner = Arc::new(inner);

        let mut outer = primary(&pool);
        pool.clear_calls();
        let err = outer
            .compile(
                &RecordingInfo::default(),
                &[Command::execute_commands(vec![Arc::clone(&inner)])],
            )
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidCommand {
                command: "execute_commands",
                ..
            }
        ));
        assert_eq!(pool.calls(), ["begin", "end"]);
        assert_eq!(Arc::strong_count(&inner), 1);
    }

    #[test]
    fn hooks_registered_while_compiling_run_in_order() {
        let pool = FakePool::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut buffer = primary(&pool);

        {
            let order = Arc::clone(&order);
            buffer
                .compile_with(
                    &RecordingInfo::default(),
                    &[Command::draw(3, 1, 0, 0)],
                    move |context| {
                        for i in 0..2 {
                            let order = Arc::clone(&order);
                            context.add_pre_execute_hook(move |queue| {
                                order.lock().unwrap().push((i, queue.family_index()));
                                Ok(())
                            });
                        }
                        Ok(())
                    },
                )
                .unwrap();
        }

        assert_eq!(pool.calls(), ["begin", "draw(3,1,0,0)", "end"]);
        assert_eq!(buffer.pre_execute_hooks().len(), 2);

        buffer.prepare_submit(&FakeQueue::new(4)).unwrap();
        buffer.prepare_submit(&FakeQueue::new(5)).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![(0, 4), (1, 4), (0, 5), (1, 5)]);

        // A plain recompile replaces the hooks.
        buffer
            .compile(&RecordingInfo::default(), &[Command::draw(3, 1, 0, 0)])
            .unwrap();
        assert!(buffer.pre_execute_hooks().is_empty());
    }

    #[test]
    fn failing_extension_keeps_previous_hooks() {
        let pool = FakePool::new();
        let mut buffer = primary(&pool);
        buffer
            .compile_with(&RecordingInfo::default(), &[], |context| {
                context.add_pre_execute_hook(|_| Ok(()));
                Ok(())
            })
            .unwrap();
        pool.clear_calls();

        let err = buffer
            .compile_with(&RecordingInfo::default(), &[Command::draw(3, 1, 0, 0)], |_| {
                Err(Error::Hook("descriptor update failed".into()))
            })
            .unwrap_err();

        assert!(matches!(err, Error::Hook(_)));
        assert_eq!(pool.calls(), ["begin", "draw(3,1,0,0)", "end"]);
        assert_eq!(buffer.pre_execute_hooks().len(), 1);
    }

    #[test]
    fn failing_hook_aborts_preparation() {
        let pool = FakePool::new();
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let mut buffer = primary(&pool);

        {
            let ran = Arc::clone(&ran);
            buffer
                .compile_with(&RecordingInfo::default(), &[], move |context| {
                    context.add_pre_execute_hook(|_| {
                        Err(Error::Hook("descriptor update failed".into()))
                    });
                    context.add_pre_execute_hook(move |_| {
                        ran.store(true, std::sync::atomic::Ordering::SeqCst);
                        Ok(())
                    });
                    Ok(())
                })
                .unwrap();
        }

        let err = buffer.prepare_submit(&FakeQueue::new(0)).unwrap_err();
        assert!(matches!(err, Error::Hook(_)));
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
