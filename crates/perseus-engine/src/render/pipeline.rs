use std::fmt::Write as _;
use std::num::NonZeroU64;

use crate::scene::{CameraRecord, InstanceRecord};

use super::error::RendererError;

/// Depth test configuration shared by every frame.
///
/// Built once: `Less` comparison with depth writes enabled.
#[derive(Debug, Clone)]
pub struct DepthState {
    state: wgpu::DepthStencilState,
}

impl DepthState {
    pub fn new(format: wgpu::TextureFormat) -> Self {
        Self {
            state: wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            },
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.state.format
    }

    pub fn state(&self) -> &wgpu::DepthStencilState {
        &self.state
    }
}

/// Compiled pipeline plus the bind group layout its ring slots are bound with.
pub struct ScenePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    depth: Option<DepthState>,
}

impl ScenePipeline {
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn depth(&self) -> Option<&DepthState> {
        self.depth.as_ref()
    }
}

/// One-shot builder for a `ScenePipeline`.
///
/// Bindings (group 0, vertex stage):
/// - `0`: `array<InstanceRecord>` read-only storage
/// - `1`: `CameraRecord` uniform, only when `with_camera` is set
pub struct PipelineBuilder<'a> {
    pub label: &'a str,
    pub source: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub color_format: wgpu::TextureFormat,
    pub vertex_layout: wgpu::VertexBufferLayout<'a>,
    pub with_camera: bool,
    pub depth: Option<DepthState>,
    pub cull_mode: Option<wgpu::Face>,
    pub front_face: wgpu::FrontFace,
}

impl PipelineBuilder<'_> {
    /// Compiles the shader and links the pipeline. Attempted exactly once.
    pub fn build(self, device: &wgpu::Device) -> Result<ScenePipeline, RendererError> {
        let shader = self.compile(device)?;

        let mut entries = vec![record_layout_entry(
            0,
            wgpu::BufferBindingType::Storage { read_only: true },
            record_binding_size::<InstanceRecord>(),
        )];
        if self.with_camera {
            entries.push(record_layout_entry(
                1,
                wgpu::BufferBindingType::Uniform,
                record_binding_size::<CameraRecord>(),
            ));
        }

        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} bgl", self.label)),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} pipeline layout", self.label)),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} pipeline", self.label)),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(self.vertex_entry),
                compilation_options: Default::default(),
                buffers: &[self.vertex_layout.clone()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(self.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: self.front_face,
                cull_mode: self.cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: self.depth.as_ref().map(|d| d.state().clone()),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(RendererError::PipelineCreation {
                label: self.label.to_string(),
                diagnostics: err.to_string(),
            });
        }

        log::debug!(
            "{}: pipeline ready (format {:?}, depth {:?}, camera {})",
            self.label,
            self.color_format,
            self.depth.as_ref().map(DepthState::format),
            self.with_camera,
        );

        Ok(ScenePipeline {
            pipeline,
            bind_group_layout,
            depth: self.depth,
        })
    }

    fn compile(&self, device: &wgpu::Device) -> Result<wgpu::ShaderModule, RendererError> {
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} shader", self.label)),
            source: wgpu::ShaderSource::Wgsl(self.source.into()),
        });
        let scope_error = pollster::block_on(scope.pop());

        let info = pollster::block_on(shader.get_compilation_info());
        let mut diagnostics = format_compilation_errors(&info);

        if let Some(err) = scope_error {
            if diagnostics.is_empty() {
                diagnostics = err.to_string();
            }
        }

        if !diagnostics.is_empty() {
            return Err(RendererError::ShaderCompilation {
                label: self.label.to_string(),
                diagnostics,
            });
        }

        Ok(shader)
    }
}

fn format_compilation_errors(info: &wgpu::CompilationInfo) -> String {
    let mut out = String::new();
    for msg in info
        .messages
        .iter()
        .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
    {
        match &msg.location {
            Some(loc) => {
                let _ = writeln!(out, "{}:{}: {}", loc.line_number, loc.line_position, msg.message);
            }
            None => {
                let _ = writeln!(out, "{}", msg.message);
            }
        }
    }
    out
}

fn record_layout_entry(
    binding: u32,
    ty: wgpu::BufferBindingType,
    min_binding_size: NonZeroU64,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: Some(min_binding_size),
        },
        count: None,
    }
}

/// Minimum binding size for one `T` record.
///
/// Record types are non-empty by construction, so this never fails.
fn record_binding_size<T>() -> NonZeroU64 {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
        .expect("GPU record types have non-zero size by construction")
}
