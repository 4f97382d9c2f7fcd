use glam::{Mat4, Vec3};

use crate::math::{
    identity, perspective, rotate_x, rotate_y, rotate_z, scale, spin_about, translate,
};
use crate::render::StaticGeometry;

use super::mesh::{MeshVertex, cube};
use super::records::{CameraRecord, InstanceRecord};
use super::{FrameUpdate, SceneDescriptor, ScenePayload, ramp_color};

/// Dimensions of the instance grid (x = rows, y = columns, z = depth).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridExtent {
    pub rows: usize,
    pub columns: usize,
    pub depth: usize,
}

impl GridExtent {
    pub const fn new(rows: usize, columns: usize, depth: usize) -> Self {
        Self { rows, columns, depth }
    }

    pub const fn count(self) -> usize {
        self.rows * self.columns * self.depth
    }
}

impl Default for GridExtent {
    fn default() -> Self {
        Self::new(10, 10, 10)
    }
}

/// Centre of the grid in view space.
pub const GRID_CENTER: Vec3 = Vec3::new(0.0, 0.0, -10.0);

/// Uniform cube scale; also half the grid spacing.
pub const GRID_SCALE: f32 = 0.2;

const ANGLE_STEP: f32 = 0.002;

/// Spinning 3-D grid of lit cubes.
#[derive(Debug, Clone)]
pub struct GridScene {
    extent: GridExtent,
    angle: f32,
}

impl GridScene {
    pub fn new(extent: GridExtent) -> Self {
        Self { extent, angle: 0.0 }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }
}

impl Default for GridScene {
    fn default() -> Self {
        Self::new(GridExtent::default())
    }
}

impl ScenePayload for GridScene {
    fn descriptor(&self) -> SceneDescriptor {
        SceneDescriptor {
            label: "perseus grid",
            shader_source: include_str!("shaders/lit.wgsl"),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            instance_count: self.extent.count() as u32,
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
        fill_grid(self.extent, self.angle, frame.instances);
        *frame.camera = CameraRecord::new(
            perspective(45f32.to_radians(), frame.aspect, 0.03, 500.0),
            identity(),
        );
    }
}

/// Writes one record per grid cell into `out`, x varying fastest.
///
/// `out` must hold exactly `extent.count()` records.
pub fn fill_grid(extent: GridExtent, angle: f32, out: &mut [InstanceRecord]) {
    debug_assert_eq!(out.len(), extent.count());

    let spin = grid_spin(angle);
    let cube_scale = scale(Vec3::splat(GRID_SCALE));
    let count = out.len();

    let (mut ix, mut iy, mut iz) = (0usize, 0usize, 0usize);
    for (i, record) in out.iter_mut().enumerate() {
        if ix == extent.rows {
            ix = 0;
            iy += 1;
        }
        if iy == extent.columns {
            iy = 0;
            iz += 1;
        }

        let local = rotate_y(angle * (iy as f32).cos()) * rotate_z(angle * (ix as f32).sin());
        let offset = translate(GRID_CENTER + cell_offset(extent, ix, iy, iz));
        let transform = spin * offset * local * cube_scale;

        *record = InstanceRecord::new(transform, ramp_color(i, count));
        ix += 1;
    }
}

fn cell_offset(extent: GridExtent, ix: usize, iy: usize, iz: usize) -> Vec3 {
    let spacing = 2.0 * GRID_SCALE;
    Vec3::new(
        (ix as f32 - extent.rows as f32 / 2.0) * spacing + GRID_SCALE,
        (iy as f32 - extent.columns as f32 / 2.0) * spacing + GRID_SCALE,
        (iz as f32 - extent.depth as f32 / 2.0) * spacing,
    )
}

/// Global spin applied to every grid instance at `angle`.
pub fn grid_spin(angle: f32) -> Mat4 {
    spin_about(GRID_CENTER, rotate_y(-angle) * rotate_x(angle * 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    fn run_frames(scene: &mut GridScene, frames: u64) -> Vec<InstanceRecord> {
        let mut instances = vec![InstanceRecord::zeroed(); scene.extent.count()];
        let mut camera = CameraRecord::zeroed();
        for frame_index in 0..frames {
            scene.update(&mut FrameUpdate {
                frame_index,
                aspect: 1.0,
                instances: &mut instances,
                camera: &mut camera,
            });
        }
        instances
    }

    #[test]
    fn first_frame_instance_zero_composition() {
        let mut scene = GridScene::default();
        let records = run_frames(&mut scene, 1);

        let a = 0.002f32;
        assert_eq!(scene.angle(), a);

        let origin = GRID_CENTER + Vec3::new(-5.0 * 0.4 + 0.2, -5.0 * 0.4 + 0.2, -5.0 * 0.4);
        let expected = grid_spin(a)
            * translate(origin)
            * rotate_y(a * 0f32.cos())
            * rotate_z(a * 0f32.sin())
            * scale(Vec3::splat(0.2));

        assert!(records[0].transform().abs_diff_eq(expected, 1e-6));
        assert!(records[0]
            .normal_transform()
            .abs_diff_eq(glam::Mat3::from_mat4(expected), 1e-6));
    }

    #[test]
    fn fill_is_bit_identical_for_the_same_angle() {
        let extent = GridExtent::default();
        let mut a = vec![InstanceRecord::zeroed(); extent.count()];
        let mut b = vec![InstanceRecord::zeroed(); extent.count()];
        fill_grid(extent, 0.734, &mut a);
        fill_grid(extent, 0.734, &mut b);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&a), bytemuck::cast_slice::<_, u8>(&b));
    }

    #[test]
    fn replayed_scene_matches() {
        let mut first = GridScene::default();
        let mut second = GridScene::default();
        let a = run_frames(&mut first, 5);
        let b = run_frames(&mut second, 5);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&a), bytemuck::cast_slice::<_, u8>(&b));
    }

    #[test]
    fn instances_enumerate_x_fastest() {
        let extent = GridExtent::new(3, 2, 2);
        let mut out = vec![InstanceRecord::zeroed(); extent.count()];
        fill_grid(extent, 0.0, &mut out);

        // At angle 0 every rotation is identity, so translations are the cell centres.
        let pos = |i: usize| out[i].transform().w_axis.truncate();
        let expect = |x, y, z| GRID_CENTER + cell_offset(extent, x, y, z);
        assert!(pos(1).abs_diff_eq(expect(1, 0, 0), 1e-6));
        assert!(pos(3).abs_diff_eq(expect(0, 1, 0), 1e-6));
        assert!(pos(6).abs_diff_eq(expect(0, 0, 1), 1e-6));
        assert!(pos(11).abs_diff_eq(expect(2, 1, 1), 1e-6));
    }

    #[test]
    fn colors_ramp_with_index() {
        let extent = GridExtent::default();
        let mut out = vec![InstanceRecord::zeroed(); extent.count()];
        fill_grid(extent, 1.0, &mut out);
        assert_eq!(out[0].color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(out[500].color[0], 0.5);
        assert!(out[250].color[2] > 0.99);
    }

    #[test]
    fn descriptor_reports_grid_count() {
        let scene = GridScene::new(GridExtent::new(4, 5, 6));
        let d = scene.descriptor();
        assert_eq!(d.instance_count, 120);
        assert!(d.uses_camera && d.depth_test);
    }
}
