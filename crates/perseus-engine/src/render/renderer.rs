use std::collections::VecDeque;

use bytemuck::Zeroable;

use crate::device::GpuFrame;
use crate::scene::{CameraRecord, FrameUpdate, InstanceRecord, SceneDescriptor, ScenePayload};

use super::config::RendererConfig;
use super::ctx::RenderCtx;
use super::depth::DepthTarget;
use super::error::RendererError;
use super::geometry::GeometryBuffers;
use super::pipeline::{DepthState, PipelineBuilder, ScenePipeline};
use super::ring::{BufferRing, array_slot_size, block_slot_size};
use super::scheduler::FrameScheduler;

/// One ring slot: the dynamic buffers of a single frame and their bind group.
struct FrameSlot {
    bind_group: wgpu::BindGroup,
    instances: wgpu::Buffer,
    camera: Option<wgpu::Buffer>,
}

/// Reusable CPU staging for one frame's records.
///
/// Allocated once at construction and zeroed by `reset` at the start of every
/// frame; nothing grows across frames.
struct FrameScratch {
    instances: Vec<InstanceRecord>,
    camera: CameraRecord,
}

impl FrameScratch {
    fn new(instance_count: usize) -> Self {
        Self {
            instances: vec![InstanceRecord::zeroed(); instance_count],
            camera: CameraRecord::zeroed(),
        }
    }

    fn reset(&mut self) {
        self.instances.fill(InstanceRecord::zeroed());
        self.camera = CameraRecord::zeroed();
    }

    fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    fn camera_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.camera)
    }
}

/// Frame renderer hosting one `ScenePayload`.
///
/// Owns every GPU object of the scene: the pipeline built once at
/// construction, the immutable geometry, and a ring of per-frame instance and
/// camera buffers. At most `frames_in_flight` frames are recorded ahead of the
/// GPU; each slot is released from the completion callback of its submission.
///
/// Fields drop in declaration order, after `Drop` has drained in-flight frames.
pub struct FrameRenderer {
    slots: BufferRing<FrameSlot>,
    depth_target: Option<DepthTarget>,
    geometry: GeometryBuffers,
    pipeline: ScenePipeline,

    scheduler: FrameScheduler,
    submissions: VecDeque<wgpu::SubmissionIndex>,
    scratch: FrameScratch,
    payload: Box<dyn ScenePayload>,
    descriptor: SceneDescriptor,
    config: RendererConfig,
    frame_index: u64,

    queue: wgpu::Queue,
    device: wgpu::Device,
}

impl FrameRenderer {
    /// Builds every GPU object for `payload`.
    ///
    /// Any failure is returned before a renderer exists, so a partially built
    /// renderer is never observable.
    pub fn new(
        ctx: &RenderCtx<'_>,
        config: RendererConfig,
        payload: Box<dyn ScenePayload>,
    ) -> Result<Self, RendererError> {
        config.validate()?;

        let descriptor = payload.descriptor();
        let label = descriptor.label;
        let instance_count = descriptor.instance_count as usize;
        if instance_count == 0 {
            return Err(RendererError::InvalidConfig(format!(
                "{label}: scene declares zero instances"
            )));
        }

        let geometry_src = payload.geometry();
        let geometry = GeometryBuffers::upload(ctx.device, label, &geometry_src)?;

        let pipeline = PipelineBuilder {
            label,
            source: descriptor.shader_source,
            vertex_entry: descriptor.vertex_entry,
            fragment_entry: descriptor.fragment_entry,
            color_format: ctx.surface_format,
            vertex_layout: geometry_src.vertex_layout(),
            with_camera: descriptor.uses_camera,
            depth: descriptor
                .depth_test
                .then(|| DepthState::new(config.depth_format)),
            cull_mode: descriptor.cull_mode,
            front_face: descriptor.front_face,
        }
        .build(ctx.device)?;

        let instance_slot = array_slot_size::<InstanceRecord>(instance_count);
        let camera_slot = block_slot_size::<CameraRecord>();
        let slots = build_slots(
            ctx.device,
            label,
            pipeline.bind_group_layout(),
            config.frames_in_flight,
            instance_slot,
            descriptor.uses_camera.then_some(camera_slot),
        )?;

        log::debug!(
            "{label}: {} ring slots, {instance_slot} instance bytes + {} camera bytes each",
            slots.len(),
            if descriptor.uses_camera { camera_slot } else { 0 },
        );
        log::info!(
            "{label}: renderer ready ({instance_count} instances, {} frames in flight, {})",
            config.frames_in_flight,
            if geometry.is_indexed() { "indexed" } else { "non-indexed" },
        );

        Ok(Self {
            slots,
            depth_target: None,
            geometry,
            pipeline,
            scheduler: FrameScheduler::new(config.frames_in_flight),
            submissions: VecDeque::with_capacity(config.frames_in_flight),
            scratch: FrameScratch::new(instance_count),
            payload,
            descriptor,
            config,
            frame_index: 0,
            queue: ctx.queue.clone(),
            device: ctx.device.clone(),
        })
    }

    /// Number of frames submitted so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn frames_in_flight(&self) -> usize {
        self.config.frames_in_flight
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn descriptor(&self) -> &SceneDescriptor {
        &self.descriptor
    }

    /// Renders and presents one frame to `target`.
    ///
    /// Blocks while `frames_in_flight` frames are still on the GPU.
    pub fn draw_frame(&mut self, target: GpuFrame) {
        self.submit_frame(&target.view, target.size());
        target.present();
    }

    // ── private helpers ───────────────────────────────────────────────────

    /// Acquires a slot, updates it, and submits one pass drawing into `view`.
    fn submit_frame(&mut self, view: &wgpu::TextureView, size: (u32, u32)) {
        // Idle -> SlotAcquired
        let device = &self.device;
        let submissions = &mut self.submissions;
        self.scheduler
            .acquire_with(|| drive_completions(device, submissions));

        let frame_index = self.frame_index;
        log::trace!(
            "frame {frame_index}: slot {} ({} in flight)",
            self.slots.slot_index(frame_index),
            self.scheduler.in_flight(),
        );

        self.update_slot(frame_index, aspect_ratio(size));
        self.ensure_depth_target(size);

        // SlotAcquired -> Encoding
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("perseus frame encoder"),
            });
        self.encode_pass(&mut encoder, view, frame_index);

        // Encoding -> Submitted
        let index = self.queue.submit(std::iter::once(encoder.finish()));
        let releaser = self.scheduler.releaser();
        self.queue
            .on_submitted_work_done(move || releaser.release());

        self.submissions.push_back(index);
        let in_flight = self.scheduler.in_flight();
        while self.submissions.len() > in_flight {
            self.submissions.pop_front();
        }

        self.frame_index += 1;
    }

    /// Blocks until every submitted frame has completed.
    fn drain(&mut self) {
        let in_flight = self.scheduler.in_flight();
        if in_flight > 0 {
            log::debug!("draining {in_flight} frames in flight");
        }
        let device = &self.device;
        let submissions = &mut self.submissions;
        self.scheduler
            .wait_idle_with(|| drive_completions(device, submissions));
    }

    /// Recomputes every record into the scratch area and uploads exactly the
    /// written bytes to the slot of `frame_index`.
    fn update_slot(&mut self, frame_index: u64, aspect: f32) {
        self.scratch.reset();
        {
            let FrameScratch { instances, camera } = &mut self.scratch;
            let mut update = FrameUpdate {
                frame_index,
                aspect,
                instances: instances.as_mut_slice(),
                camera,
            };
            self.payload.update(&mut update);
        }

        let slot = self.slots.slot(frame_index);
        self.queue
            .write_buffer(&slot.instances, 0, self.scratch.instance_bytes());
        if let Some(camera) = &slot.camera {
            self.queue
                .write_buffer(camera, 0, self.scratch.camera_bytes());
        }
    }

    fn ensure_depth_target(&mut self, size: (u32, u32)) {
        let Some(depth) = self.pipeline.depth() else {
            return;
        };
        if self.depth_target.as_ref().is_some_and(|d| d.matches(size)) {
            return;
        }
        self.depth_target = Some(DepthTarget::new(&self.device, depth.format(), size));
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        frame_index: u64,
    ) {
        let depth_stencil_attachment = self.depth_target.as_ref().map(|depth| {
            wgpu::RenderPassDepthStencilAttachment {
                view: depth.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }
        });

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("perseus scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.config.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(self.pipeline.raw());
        rpass.set_bind_group(0, &self.slots.slot(frame_index).bind_group, &[]);
        self.geometry
            .draw(&mut rpass, 0..self.descriptor.instance_count);
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        self.drain();
    }
}

/// Width over height, `1.0` for degenerate sizes.
fn aspect_ratio((width, height): (u32, u32)) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// Allocates `frames` ring slots and binds each against `layout`.
///
/// Runs inside a validation error scope so a layout mismatch is returned
/// instead of reaching the uncaptured-error handler.
fn build_slots(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    frames: usize,
    instance_slot: u64,
    camera_slot: Option<u64>,
) -> Result<BufferRing<FrameSlot>, RendererError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let slots = BufferRing::from_fn(frames, |i| {
        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} instances #{i}")),
            size: instance_slot,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera = camera_slot.map(|size| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{label} camera #{i}")),
                size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: instances.as_entire_binding(),
        }];
        if let Some(camera) = &camera {
            entries.push(wgpu::BindGroupEntry {
                binding: 1,
                resource: camera.as_entire_binding(),
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} bind group #{i}")),
            layout,
            entries: &entries,
        });

        FrameSlot {
            bind_group,
            instances,
            camera,
        }
    });

    if let Some(err) = pollster::block_on(scope.pop()) {
        return Err(RendererError::PipelineCreation {
            label: label.to_string(),
            diagnostics: err.to_string(),
        });
    }

    Ok(slots)
}

/// Polls the device so completion callbacks can fire.
///
/// Blocks on the oldest outstanding submission when one is known.
fn drive_completions(device: &wgpu::Device, submissions: &mut VecDeque<wgpu::SubmissionIndex>) {
    let poll = match submissions.pop_front() {
        Some(index) => wgpu::PollType::Wait {
            submission_index: Some(index),
            timeout: None,
        },
        None => wgpu::PollType::Poll,
    };
    let waited = matches!(poll, wgpu::PollType::Wait { .. });

    if let Err(err) = device.poll(poll) {
        log::warn!("device poll failed: {err}");
    }
    if !waited {
        std::thread::yield_now();
    }
}
