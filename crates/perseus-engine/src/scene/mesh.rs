use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Position + normal vertex for lit meshes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // normal
    ];
}

/// Axis-aligned cube centred on the origin, `2 * half` wide.
///
/// Four vertices per face so normals stay flat; faces wind counter-clockwise
/// seen from outside.
pub fn cube(half: f32) -> (Vec<MeshVertex>, Vec<u16>) {
    // (normal, u, v) with u x v == normal.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        let c = normal * half;
        let (u, v) = (u * half, v * half);
        for corner in [c - u - v, c + u - v, c + u + v, c - u + v] {
            vertices.push(MeshVertex {
                position: corner.to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_flat_faces() {
        let (v, i) = cube(0.5);
        assert_eq!(v.len(), 24);
        assert_eq!(i.len(), 36);
        for p in &v {
            let m = Vec3::from_array(p.position).abs().max_element();
            assert!((m - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let (v, i) = cube(0.5);
        for tri in i.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|k| Vec3::from_array(v[k as usize].position));
            let n = Vec3::from_array(v[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }
}
