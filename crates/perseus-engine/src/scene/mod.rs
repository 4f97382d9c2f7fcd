//! Scene payloads hosted by the frame renderer.
//!
//! A payload supplies everything that varies between scenes: shader and
//! fixed-function description, static geometry, and the per-frame procedural
//! fill of instance and camera records. The renderer owns all GPU objects.

mod grid;
mod mesh;
mod orbit;
mod records;
mod triangle;

pub use grid::{GridExtent, GridScene, fill_grid};
pub use mesh::{MeshVertex, cube};
pub use orbit::{ORBIT_INSTANCES, OrbitScene, fill_orbit, orbit_color};
pub use records::{CameraRecord, InstanceRecord};
pub use triangle::TriangleScene;

use crate::render::StaticGeometry;

/// Fixed pipeline and draw description of a scene.
#[derive(Debug, Clone)]
pub struct SceneDescriptor {
    pub label: &'static str,
    pub shader_source: &'static str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,

    /// Instances drawn every frame; also the instance ring slot length.
    pub instance_count: u32,

    /// Allocates a camera ring and binds it at `@binding(1)`.
    pub uses_camera: bool,

    pub depth_test: bool,
    pub cull_mode: Option<wgpu::Face>,
    pub front_face: wgpu::FrontFace,
}

/// Writable view of the ring slot selected for one frame.
pub struct FrameUpdate<'a> {
    pub frame_index: u64,

    /// Width / height of the current render target.
    pub aspect: f32,

    /// Exactly `instance_count` records; every one must be written.
    pub instances: &'a mut [InstanceRecord],

    /// Ignored unless the descriptor sets `uses_camera`.
    pub camera: &'a mut CameraRecord,
}

/// Scene contract implemented by each payload.
pub trait ScenePayload {
    fn descriptor(&self) -> SceneDescriptor;

    /// Vertex/index data uploaded once at renderer construction.
    fn geometry(&self) -> StaticGeometry;

    /// Recomputes every record for this frame. Must be deterministic in the
    /// payload's own state (no clocks, no randomness).
    fn update(&mut self, frame: &mut FrameUpdate<'_>);
}

/// Hue ramp shared by the instanced scenes: `(t, 1 - t, sin(2πt), 1)` for `t = i / n`.
pub(crate) fn ramp_color(index: usize, count: usize) -> glam::Vec4 {
    let t = index as f32 / count as f32;
    glam::Vec4::new(t, 1.0 - t, (std::f32::consts::TAU * t).sin(), 1.0)
}
