use glam::{Vec3, Vec4};

use crate::math::{identity, perspective, rotate_y, rotate_z, scale, spin_about, translate};
use crate::render::StaticGeometry;

use super::mesh::{MeshVertex, cube};
use super::records::{CameraRecord, InstanceRecord};
use super::{FrameUpdate, SceneDescriptor, ScenePayload, ramp_color};

pub const ORBIT_INSTANCES: usize = 32;

const ORBIT_CENTER: Vec3 = Vec3::new(0.0, 0.0, -5.0);
const ORBIT_SCALE: f32 = 0.1;
const ANGLE_STEP: f32 = 0.01;

/// A wave of cubes sweeping one period of a sine around a common centre.
#[derive(Debug, Clone, Default)]
pub struct OrbitScene {
    angle: f32,
}

impl OrbitScene {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScenePayload for OrbitScene {
    fn descriptor(&self) -> SceneDescriptor {
        SceneDescriptor {
            label: "perseus orbit",
            shader_source: include_str!("shaders/lit.wgsl"),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            instance_count: ORBIT_INSTANCES as u32,
            uses_camera: true,
            depth_test: true,
            cull_mode: Some(wgpu::Face::Back),
            front_face: wgpu::FrontFace::Ccw,
        }
    }

    fn geometry(&self) -> StaticGeometry {
        let (vertices, indices) = cube(0.5);
        StaticGeometry::new(&vertices, &MeshVertex::ATTRS).with_indices(indices)
    }

    fn update(&mut self, frame: &mut FrameUpdate<'_>) {
        self.angle += ANGLE_STEP;
        fill_orbit(self.angle, frame.instances);
        *frame.camera = CameraRecord::new(
            perspective(45f32.to_radians(), frame.aspect, 0.03, 500.0),
            identity(),
        );
    }
}

/// Color of orbit instance `index`. Independent of time.
pub fn orbit_color(index: usize) -> Vec4 {
    ramp_color(index, ORBIT_INSTANCES)
}

/// Writes every orbit instance for `angle` into `out`.
pub fn fill_orbit(angle: f32, out: &mut [InstanceRecord]) {
    let count = out.len();
    let spin = spin_about(ORBIT_CENTER, rotate_y(-angle));
    let local = rotate_y(angle) * rotate_z(angle) * scale(Vec3::splat(ORBIT_SCALE));

    for (i, record) in out.iter_mut().enumerate() {
        let t = i as f32 / count as f32;
        let x = (t * 2.0 - 1.0) + 1.0 / count as f32;
        let y = ((t + angle) * std::f32::consts::TAU).sin();

        let transform = spin * translate(ORBIT_CENTER + Vec3::new(x, y, 0.0)) * local;
        *record = InstanceRecord::new(transform, ramp_color(i, count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;
    use std::f32::consts::PI;

    fn frame(scene: &mut OrbitScene, frame_index: u64, out: &mut [InstanceRecord]) {
        let mut camera = CameraRecord::zeroed();
        scene.update(&mut FrameUpdate {
            frame_index,
            aspect: 1.0,
            instances: out,
            camera: &mut camera,
        });
    }

    #[test]
    fn colors_ignore_frame_index() {
        let mut scene = OrbitScene::new();
        let mut out = vec![InstanceRecord::zeroed(); ORBIT_INSTANCES];

        for frame_index in [0u64, 1, 7, 300] {
            frame(&mut scene, frame_index, &mut out);
            for (i, rec) in out.iter().enumerate() {
                let t = i as f32 / 32.0;
                let expected = Vec4::new(t, 1.0 - t, (2.0 * PI * t).sin(), 1.0);
                assert!(rec.color().abs_diff_eq(expected, 1e-6), "instance {i}");
            }
        }
    }

    #[test]
    fn instances_span_the_unit_interval() {
        let mut out = vec![InstanceRecord::zeroed(); ORBIT_INSTANCES];
        fill_orbit(0.0, &mut out);

        let first = out[0].transform().w_axis;
        let last = out[ORBIT_INSTANCES - 1].transform().w_axis;
        assert!((first.x - (-1.0 + 1.0 / 32.0)).abs() < 1e-6);
        assert!((last.x - (1.0 - 1.0 / 32.0)).abs() < 1e-6);
        assert!((first.z - ORBIT_CENTER.z).abs() < 1e-6);
    }

    #[test]
    fn fill_is_deterministic() {
        let mut a = vec![InstanceRecord::zeroed(); ORBIT_INSTANCES];
        let mut b = vec![InstanceRecord::zeroed(); ORBIT_INSTANCES];
        fill_orbit(2.5, &mut a);
        fill_orbit(2.5, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn camera_uses_target_aspect() {
        let mut scene = OrbitScene::new();
        let mut out = vec![InstanceRecord::zeroed(); ORBIT_INSTANCES];
        let mut camera = CameraRecord::zeroed();
        scene.update(&mut FrameUpdate {
            frame_index: 0,
            aspect: 2.0,
            instances: &mut out,
            camera: &mut camera,
        });
        let expected = perspective(45f32.to_radians(), 2.0, 0.03, 500.0);
        assert_eq!(camera.projection(), expected);
        assert_eq!(camera.view(), glam::Mat4::IDENTITY);
    }
}
