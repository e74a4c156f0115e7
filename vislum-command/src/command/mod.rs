//! Declarative command recording.
//!
//! Commands are described as [`Command`] values and compiled into a
//! [`CommandBuffer`] in one pass. The buffer keeps every resource the
//! commands referenced alive until it is recompiled or dropped.

pub mod buffer;
pub mod dispatch;
pub mod native;
pub mod pool;
pub mod types;

pub use buffer::{CommandBuffer, Inheritance, RecordingInfo};
pub use dispatch::RecordingContext;
pub use native::{AshRecorder, CommandRecorder, NativeCall};
pub use pool::{CommandPool, CommandPoolCreateInfo, RawCommandPool, allocate};
pub use types::{
    BufferMemoryBarrier, Command, CommandBufferLevel, CommandBufferUsage, ImageMemoryBarrier,
    MemoryBarrier, RenderPassScope, clear_color, clear_depth_stencil,
};
