//! Transform construction helpers.
//!
//! Conventions:
//! - column-major `glam` matrices, column vectors (`M * v`)
//! - right-handed view space, camera looks down -Z
//! - projection depth range `[0, 1]` (wgpu clip space)

mod transform;

pub use glam::{Mat3, Mat4, Vec3, Vec4};
pub use transform::{
    discard_translation, identity, perspective, rotate_x, rotate_y, rotate_z, scale, spin_about,
    translate,
};
