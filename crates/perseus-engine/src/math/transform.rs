use glam::{Mat3, Mat4, Vec3};

#[inline]
pub fn identity() -> Mat4 {
    Mat4::IDENTITY
}

#[inline]
pub fn translate(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

#[inline]
pub fn scale(factors: Vec3) -> Mat4 {
    Mat4::from_scale(factors)
}

/// Rotation about +X by `angle` radians (counter-clockwise looking down the axis).
#[inline]
pub fn rotate_x(angle: f32) -> Mat4 {
    Mat4::from_rotation_x(angle)
}

/// Rotation about +Y by `angle` radians.
#[inline]
pub fn rotate_y(angle: f32) -> Mat4 {
    Mat4::from_rotation_y(angle)
}

/// Rotation about +Z by `angle` radians.
#[inline]
pub fn rotate_z(angle: f32) -> Mat4 {
    Mat4::from_rotation_z(angle)
}

/// Right-handed perspective projection with a `[0, 1]` depth range.
///
/// `fov_y` is the full vertical field of view in radians.
#[inline]
pub fn perspective(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y, aspect, z_near, z_far)
}

/// Upper 3x3 of `m`: the linear part without translation.
///
/// Used as the normal transform for instance and camera records.
#[inline]
pub fn discard_translation(m: Mat4) -> Mat3 {
    Mat3::from_mat4(m)
}

/// Applies `rotation` about `pivot` instead of the origin: `T(p) * R * T(-p)`.
#[inline]
pub fn spin_about(pivot: Vec3, rotation: Mat4) -> Mat4 {
    translate(pivot) * rotation * translate(-pivot)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn sample() -> Mat4 {
        translate(Vec3::new(1.0, -2.0, 3.5)) * rotate_z(0.7) * scale(Vec3::new(2.0, 0.5, 1.0))
    }

    // ── identities ────────────────────────────────────────────────────────

    #[test]
    fn unit_scale_is_neutral_on_both_sides() {
        let t = sample();
        let one = scale(Vec3::ONE);
        assert!((one * t).abs_diff_eq(t, EPS));
        assert!((t * one).abs_diff_eq(t, EPS));
    }

    #[test]
    fn zero_rotations_are_identity() {
        assert!(rotate_x(0.0).abs_diff_eq(Mat4::IDENTITY, EPS));
        assert!(rotate_y(0.0).abs_diff_eq(Mat4::IDENTITY, EPS));
        assert!(rotate_z(0.0).abs_diff_eq(Mat4::IDENTITY, EPS));
    }

    #[test]
    fn spin_about_keeps_pivot_fixed() {
        let pivot = Vec3::new(0.0, 0.0, -10.0);
        let m = spin_about(pivot, rotate_y(1.3) * rotate_x(0.4));
        assert!(m.transform_point3(pivot).abs_diff_eq(pivot, 1e-5));
    }

    // ── rotation direction ────────────────────────────────────────────────

    #[test]
    fn rotate_z_quarter_turn_maps_x_to_y() {
        let v = rotate_z(std::f32::consts::FRAC_PI_2).transform_vector3(Vec3::X);
        assert!(v.abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn rotate_y_quarter_turn_maps_z_to_x() {
        let v = rotate_y(std::f32::consts::FRAC_PI_2).transform_vector3(Vec3::Z);
        assert!(v.abs_diff_eq(Vec3::X, EPS));
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let p = perspective(45f32.to_radians(), 1.0, 0.03, 500.0);
        let near = p.project_point3(Vec3::new(0.0, 0.0, -0.03));
        let far = p.project_point3(Vec3::new(0.0, 0.0, -500.0));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    // ── normal transform ──────────────────────────────────────────────────

    #[test]
    fn discard_translation_drops_offset_only() {
        let linear = rotate_x(0.3) * scale(Vec3::splat(0.2));
        let m = translate(Vec3::new(5.0, 6.0, 7.0)) * linear;
        assert!(discard_translation(m).abs_diff_eq(Mat3::from_mat4(linear), EPS));
    }
}
