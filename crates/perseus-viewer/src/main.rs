//! Perseus viewer.
//!
//! Opens a 1024x1024 window and renders one of the built-in scenes.
//!
//! # Usage
//!
//! ```bash
//! perseus-viewer
//! perseus-viewer --scene orbit --frames-in-flight 2
//! perseus-viewer --scene triangle --log perseus_engine=trace
//! ```
//!
//! # Keyboard Shortcuts
//!
//! - ESC: Quit
//! - Ctrl/Cmd+Q: Quit
//! - Ctrl/Cmd+W: Close window

use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use perseus_engine::device::GpuInit;
use perseus_engine::logging::{LoggingConfig, init_logging};
use perseus_engine::render::{FRAMES_IN_FLIGHT, RendererConfig};
use perseus_engine::scene::{GridScene, OrbitScene, ScenePayload, TriangleScene};
use perseus_engine::window::{Runtime, RuntimeConfig};

#[derive(Parser)]
#[command(name = "perseus-viewer")]
#[command(author, version, about = "Bounded frames-in-flight instanced renderer")]
struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value_t = Scene::Grid)]
    scene: Scene,

    /// Frames the CPU may record ahead of the GPU (1-8)
    #[arg(long, default_value_t = FRAMES_IN_FLIGHT)]
    frames_in_flight: usize,

    /// Log filter in env_logger syntax (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scene {
    /// 10x10x10 lit cubes
    Grid,
    /// 32 cubes on a sine sweep
    Orbit,
    /// One vertex-colored triangle
    Triangle,
}

impl Scene {
    fn payload(self) -> Box<dyn ScenePayload> {
        match self {
            Scene::Grid => Box::new(GridScene::default()),
            Scene::Orbit => Box::new(OrbitScene::default()),
            Scene::Triangle => Box::new(TriangleScene),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    log::info!("scene {:?}, {} frames in flight", args.scene, args.frames_in_flight);

    let renderer = RendererConfig {
        frames_in_flight: args.frames_in_flight,
        ..RendererConfig::default()
    };

    match Runtime::run(
        RuntimeConfig::default(),
        GpuInit::default(),
        renderer,
        args.scene.payload(),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("perseus-viewer failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_grid_with_three_frames() {
        let args = Args::try_parse_from(["perseus-viewer"]).unwrap();
        assert_eq!(args.scene, Scene::Grid);
        assert_eq!(args.frames_in_flight, 3);
        assert!(args.log.is_none());
    }

    #[test]
    fn parses_scene_and_frame_count() {
        let args =
            Args::try_parse_from(["perseus-viewer", "--scene", "triangle", "--frames-in-flight", "2"])
                .unwrap();
        assert_eq!(args.scene, Scene::Triangle);
        assert_eq!(args.frames_in_flight, 2);
    }

    #[test]
    fn unknown_scene_is_rejected() {
        assert!(Args::try_parse_from(["perseus-viewer", "--scene", "teapot"]).is_err());
    }

    #[test]
    fn payload_matches_scene() {
        assert_eq!(Scene::Orbit.payload().descriptor().instance_count, 32);
        assert_eq!(Scene::Grid.payload().descriptor().instance_count, 1000);
        assert_eq!(Scene::Triangle.payload().descriptor().instance_count, 1);
    }
}
