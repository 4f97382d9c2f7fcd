//! CPU mirrors of the WGSL `InstanceRecord` / `CameraRecord` structs.
//!
//! Field order and padding must stay byte-identical to the shader declarations:
//! `mat3x3<f32>` is three 16-byte columns, every struct is 16-byte aligned.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec4};

use crate::math::discard_translation;

/// Per-instance data read by the vertex stage through `@builtin(instance_index)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceRecord {
    pub transform: [[f32; 4]; 4],
    pub normal_transform: [[f32; 4]; 3],
    pub color: [f32; 4],
}

impl InstanceRecord {
    /// Record for `transform` with its upper 3x3 as the normal transform.
    pub fn new(transform: Mat4, color: Vec4) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            normal_transform: pack_mat3(discard_translation(transform)),
            color: color.to_array(),
        }
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.transform)
    }

    pub fn normal_transform(&self) -> Mat3 {
        unpack_mat3(&self.normal_transform)
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}

/// Per-frame camera block (`@group(0) @binding(1)` uniform).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraRecord {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub view_normal: [[f32; 4]; 3],
}

impl CameraRecord {
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            view_normal: pack_mat3(discard_translation(view)),
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.projection)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }
}

fn pack_mat3(m: Mat3) -> [[f32; 4]; 3] {
    [
        m.x_axis.extend(0.0).to_array(),
        m.y_axis.extend(0.0).to_array(),
        m.z_axis.extend(0.0).to_array(),
    ]
}

fn unpack_mat3(cols: &[[f32; 4]; 3]) -> Mat3 {
    Mat3::from_cols(
        Vec4::from_array(cols[0]).truncate(),
        Vec4::from_array(cols[1]).truncate(),
        Vec4::from_array(cols[2]).truncate(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::mem::{align_of, offset_of, size_of};

    // ── WGSL layout ───────────────────────────────────────────────────────

    #[test]
    fn instance_record_matches_wgsl_layout() {
        assert_eq!(size_of::<InstanceRecord>(), 128);
        assert_eq!(offset_of!(InstanceRecord, transform), 0);
        assert_eq!(offset_of!(InstanceRecord, normal_transform), 64);
        assert_eq!(offset_of!(InstanceRecord, color), 112);
        assert_eq!(size_of::<InstanceRecord>() % 16, 0);
        assert!(align_of::<InstanceRecord>() <= 16);
    }

    #[test]
    fn camera_record_matches_wgsl_layout() {
        assert_eq!(size_of::<CameraRecord>(), 176);
        assert_eq!(offset_of!(CameraRecord, projection), 0);
        assert_eq!(offset_of!(CameraRecord, view), 64);
        assert_eq!(offset_of!(CameraRecord, view_normal), 128);
    }

    // ── packing ───────────────────────────────────────────────────────────

    #[test]
    fn normal_transform_is_upper_3x3_with_zero_padding() {
        let t = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0))
            * Mat4::from_rotation_y(0.5)
            * Mat4::from_scale(Vec3::new(1.0, 2.0, 3.0));
        let rec = InstanceRecord::new(t, Vec4::ONE);

        assert_eq!(rec.normal_transform(), Mat3::from_mat4(t));
        for col in rec.normal_transform {
            assert_eq!(col[3], 0.0);
        }
        assert_eq!(rec.transform(), t);
    }

    #[test]
    fn camera_view_normal_drops_translation() {
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0));
        let cam = CameraRecord::new(Mat4::IDENTITY, view);
        assert_eq!(unpack_mat3(&cam.view_normal), Mat3::IDENTITY);
        assert_eq!(cam.view(), view);
    }
}
