use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::math::identity;
use crate::render::StaticGeometry;

use super::records::InstanceRecord;
use super::{FrameUpdate, SceneDescriptor, ScenePayload};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ColorVertex {
    position: [f32; 3],
    color: [f32; 3],
}

impl ColorVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // color
    ];
}

const VERTICES: [ColorVertex; 3] = [
    ColorVertex { position: [-0.8, 0.8, 0.0], color: [1.0, 0.3, 0.2] },
    ColorVertex { position: [0.0, -0.8, 0.0], color: [0.8, 1.0, 0.0] },
    ColorVertex { position: [0.8, 0.8, 0.0], color: [0.8, 0.0, 1.0] },
];

/// Single static triangle with per-vertex colors, drawn in clip space.
///
/// No camera, no depth, one identity instance.
#[derive(Debug, Clone, Default)]
pub struct TriangleScene;

impl TriangleScene {
    pub fn new() -> Self {
        Self
    }
}

impl ScenePayload for TriangleScene {
    fn descriptor(&self) -> SceneDescriptor {
        SceneDescriptor {
            label: "perseus triangle",
            shader_source: include_str!("shaders/triangle.wgsl"),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            instance_count: 1,
            uses_camera: false,
            depth_test: false,
            cull_mode: None,
            front_face: wgpu::FrontFace::Ccw,
        }
    }

    fn geometry(&self) -> StaticGeometry {
        StaticGeometry::new(&VERTICES, &ColorVertex::ATTRS)
    }

    fn update(&mut self, frame: &mut FrameUpdate<'_>) {
        for record in frame.instances.iter_mut() {
            *record = InstanceRecord::new(identity(), Vec4::ONE);
        }
    }
}
