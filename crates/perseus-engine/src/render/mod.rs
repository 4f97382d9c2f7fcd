//! Instanced frame renderer.
//!
//! A `FrameRenderer` hosts one `ScenePayload` and owns every GPU object it
//! needs. Per-frame data lives in a ring of `frames_in_flight` slots; the
//! `FrameScheduler` keeps the CPU from overwriting a slot the GPU still reads.
//!
//! Convention:
//! - right-handed world space, camera looking down -Z
//! - clip-space depth in [0, 1]

mod config;
mod ctx;
mod depth;
mod error;
mod geometry;
mod pipeline;
mod renderer;
mod ring;
mod scheduler;

pub use config::RendererConfig;
pub use ctx::RenderCtx;
pub use error::RendererError;
pub use geometry::{GeometryBuffers, StaticGeometry};
pub use pipeline::{DepthState, PipelineBuilder, ScenePipeline};
pub use renderer::FrameRenderer;
pub use ring::{BufferRing, FRAMES_IN_FLIGHT, MAX_FRAMES_IN_FLIGHT, array_slot_size, block_slot_size};
pub use scheduler::{FrameScheduler, Releaser};
