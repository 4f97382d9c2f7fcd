use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::render::{FrameRenderer, RendererConfig};
use crate::scene::ScenePayload;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Powered by Perseus".to_string(),
            initial_size: LogicalSize::new(1024.0, 1024.0),
        }
    }
}

/// Entry point for the host.
///
/// Opens one window, builds a `FrameRenderer` for `payload` against it and
/// draws one frame per redraw until the window closes.
pub struct Runtime;

impl Runtime {
    pub fn run(
        window: RuntimeConfig,
        gpu_init: GpuInit,
        renderer: RendererConfig,
        payload: Box<dyn ScenePayload>,
    ) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = HostState::new(window, gpu_init, renderer, payload);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Live window. The renderer is declared first so it drains and drops
/// before the surface and window it presents to.
struct Host {
    renderer: FrameRenderer,
    entry: WindowEntry,
}

struct HostState {
    window_config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer_config: RendererConfig,
    payload: Option<Box<dyn ScenePayload>>,

    host: Option<Host>,
    modifiers: ModifiersState,
    failure: Option<anyhow::Error>,
}

impl HostState {
    fn new(
        window_config: RuntimeConfig,
        gpu_init: GpuInit,
        renderer_config: RendererConfig,
        payload: Box<dyn ScenePayload>,
    ) -> Self {
        Self {
            window_config,
            gpu_init,
            renderer_config,
            payload: Some(payload),
            host: None,
            modifiers: ModifiersState::empty(),
            failure: None,
        }
    }

    fn create_host(&mut self, event_loop: &ActiveEventLoop) -> Result<Host> {
        let payload = self
            .payload
            .take()
            .context("scene payload already consumed")?;

        let attrs = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(self.window_config.initial_size)
            .with_transparent(true);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        let config = self.renderer_config.clone();
        let renderer = entry
            .with_gpu(|gpu| FrameRenderer::new(&gpu.render_ctx(), config, payload))
            .context("failed to build frame renderer")?;

        Ok(Host { renderer, entry })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.close(event_loop);
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        // Dropping the host drains in-flight frames before the window goes away.
        self.host = None;
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        let Host { renderer, entry } = host;

        let size = entry.borrow_gpu().size();
        if size.width == 0 || size.height == 0 {
            return;
        }

        let frame = match entry.borrow_gpu().begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let action = entry.with_gpu_mut(|gpu| gpu.handle_surface_error(err));
                if action == SurfaceErrorAction::Fatal {
                    self.fail(event_loop, anyhow::anyhow!("surface lost beyond recovery"));
                }
                return;
            }
        };

        entry.borrow_window().pre_present_notify();
        renderer.draw_frame(frame);
    }
}

impl ApplicationHandler for HostState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() || self.failure.is_some() {
            return;
        }

        match self.create_host(event_loop) {
            Ok(host) => {
                host.entry.borrow_window().request_redraw();
                self.host = Some(host);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw, paced by the surface's present mode.
        if let Some(host) = &self.host {
            host.entry.borrow_window().request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.close(event_loop),

            WindowEvent::ModifiersChanged(m) => self.modifiers = m.state(),

            WindowEvent::KeyboardInput { event, .. } => {
                if is_close_shortcut(&event, self.modifiers) {
                    log::info!("close requested from keyboard");
                    self.close(event_loop);
                }
            }

            WindowEvent::Resized(new_size) => {
                if let Some(host) = self.host.as_mut() {
                    host.entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    host.entry.borrow_window().request_redraw();
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(host) = self.host.as_mut() {
                    let new_size = host.entry.borrow_window().inner_size();
                    host.entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(host) = self.host.take() {
            log::info!("exiting after {} frames", host.renderer.frame_index());
        }
    }
}

fn is_close_shortcut(event: &KeyEvent, modifiers: ModifiersState) -> bool {
    event.state == ElementState::Pressed
        && !event.repeat
        && matches!(event.physical_key, PhysicalKey::Code(code) if closes_window(code, modifiers))
}

/// Escape, or Q / W with the platform command modifier (Ctrl or Cmd).
fn closes_window(code: KeyCode, modifiers: ModifiersState) -> bool {
    let command = modifiers.control_key() || modifiers.super_key();
    match code {
        KeyCode::Escape => true,
        KeyCode::KeyQ | KeyCode::KeyW => command,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_closes_without_modifiers() {
        assert!(closes_window(KeyCode::Escape, ModifiersState::empty()));
    }

    #[test]
    fn quit_and_close_need_the_command_modifier() {
        for code in [KeyCode::KeyQ, KeyCode::KeyW] {
            assert!(!closes_window(code, ModifiersState::empty()));
            assert!(!closes_window(code, ModifiersState::SHIFT));
            assert!(closes_window(code, ModifiersState::CONTROL));
            assert!(closes_window(code, ModifiersState::SUPER));
        }
    }

    #[test]
    fn other_keys_never_close() {
        assert!(!closes_window(KeyCode::KeyA, ModifiersState::CONTROL));
    }

    #[test]
    fn default_window_matches_the_viewer() {
        let config = RuntimeConfig::default();
        assert_eq!(config.title, "Powered by Perseus");
        assert_eq!(config.initial_size, LogicalSize::new(1024.0, 1024.0));
    }
}
