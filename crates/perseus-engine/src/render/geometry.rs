use std::ops::Range;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use super::error::RendererError;

/// CPU-side vertex and index arrays handed to the renderer once at construction.
#[derive(Debug, Clone)]
pub struct StaticGeometry {
    vertex_bytes: Vec<u8>,
    vertex_count: u32,
    stride: u64,
    attributes: &'static [wgpu::VertexAttribute],
    indices: Option<Vec<u16>>,
}

impl StaticGeometry {
    /// Non-indexed geometry from `vertices` described by `attributes`.
    pub fn new<V: Pod>(vertices: &[V], attributes: &'static [wgpu::VertexAttribute]) -> Self {
        Self {
            vertex_bytes: bytemuck::cast_slice(vertices).to_vec(),
            vertex_count: vertices.len() as u32,
            stride: std::mem::size_of::<V>() as u64,
            attributes,
            indices: None,
        }
    }

    /// Switches to an indexed draw over `indices`.
    pub fn with_indices(mut self, indices: Vec<u16>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        &self.vertex_bytes
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    pub fn vertex_layout(&self) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: self.attributes,
        }
    }
}

/// Immutable GPU copies of a `StaticGeometry`.
///
/// Buffers are sized exactly to the source arrays and uploaded in full at
/// creation. Nothing writes them afterwards (no `COPY_DST` usage).
pub struct GeometryBuffers {
    vertices: wgpu::Buffer,
    vertex_count: u32,
    indices: Option<(wgpu::Buffer, u32)>,
}

impl GeometryBuffers {
    pub fn upload(
        device: &wgpu::Device,
        label: &str,
        geometry: &StaticGeometry,
    ) -> Result<Self, RendererError> {
        if geometry.vertex_count == 0 {
            return Err(RendererError::EmptyGeometry {
                label: label.to_string(),
            });
        }

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertices")),
            contents: &geometry.vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let indices = match geometry.indices.as_deref() {
            Some([]) => {
                return Err(RendererError::EmptyGeometry {
                    label: label.to_string(),
                });
            }
            Some(indices) => {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} indices")),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                Some((buffer, indices.len() as u32))
            }
            None => None,
        };

        log::debug!(
            "{label}: uploaded {} vertices ({} bytes), {} indices",
            geometry.vertex_count,
            geometry.vertex_bytes.len(),
            indices.as_ref().map_or(0, |(_, n)| *n),
        );

        Ok(Self {
            vertices,
            vertex_count: geometry.vertex_count,
            indices,
        })
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Binds the buffers and issues one draw covering `instances`.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, instances: Range<u32>) {
        rpass.set_vertex_buffer(0, self.vertices.slice(..));
        match &self.indices {
            Some((buffer, count)) => {
                rpass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..*count, 0, instances);
            }
            None => rpass.draw(0..self.vertex_count, instances),
        }
    }
}
