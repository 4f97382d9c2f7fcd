use super::error::RendererError;
use super::ring::{FRAMES_IN_FLIGHT, MAX_FRAMES_IN_FLIGHT};

/// Construction parameters for a `FrameRenderer`.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Number of frames the CPU may record ahead of the GPU.
    ///
    /// Also the number of slots in every dynamic buffer ring.
    pub frames_in_flight: usize,

    /// Depth attachment format, used only by scenes that enable depth testing.
    pub depth_format: wgpu::TextureFormat,

    /// Clear color for the color attachment.
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: FRAMES_IN_FLIGHT,
            depth_format: wgpu::TextureFormat::Depth32Float,
            clear_color: wgpu::Color { r: 0.0, g: 0.0, b: 0.0, a: 0.8 },
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), RendererError> {
        if !(1..=MAX_FRAMES_IN_FLIGHT).contains(&self.frames_in_flight) {
            return Err(RendererError::InvalidConfig(format!(
                "frames_in_flight must be within 1..={MAX_FRAMES_IN_FLIGHT}, got {}",
                self.frames_in_flight
            )));
        }
        if !self.depth_format.is_depth_stencil_format() {
            return Err(RendererError::InvalidConfig(format!(
                "depth_format {:?} has no depth aspect",
                self.depth_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RendererConfig::default();
        assert_eq!(config.frames_in_flight, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_frames_in_flight_is_rejected() {
        let config = RendererConfig { frames_in_flight: 0, ..RendererConfig::default() };
        assert!(matches!(config.validate(), Err(RendererError::InvalidConfig(_))));
    }

    #[test]
    fn too_many_frames_in_flight_is_rejected() {
        let config = RendererConfig {
            frames_in_flight: MAX_FRAMES_IN_FLIGHT + 1,
            ..RendererConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn color_depth_format_is_rejected() {
        let config = RendererConfig {
            depth_format: wgpu::TextureFormat::Rgba8Unorm,
            ..RendererConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn struct_update_keeps_other_defaults() {
        let config = RendererConfig { frames_in_flight: 2, ..RendererConfig::default() };
        assert_eq!(config.depth_format, wgpu::TextureFormat::Depth32Float);
        assert!(config.validate().is_ok());
    }
}
