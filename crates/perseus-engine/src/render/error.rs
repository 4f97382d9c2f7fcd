use thiserror::Error;

/// Renderer construction failures.
///
/// All variants are fatal: a renderer is either fully built or not returned at all.
#[derive(Debug, Error)]
pub enum RendererError {
    /// The backend rejected the shader source.
    #[error("shader `{label}` failed to compile:\n{diagnostics}")]
    ShaderCompilation { label: String, diagnostics: String },

    /// Shader stages compiled but could not be linked into a pipeline.
    #[error("pipeline `{label}` could not be created:\n{diagnostics}")]
    PipelineCreation { label: String, diagnostics: String },

    /// Static geometry had no vertices to upload.
    #[error("scene `{label}` provided no vertex data")]
    EmptyGeometry { label: String },

    /// Configuration values outside of the supported range.
    #[error("invalid renderer configuration: {0}")]
    InvalidConfig(String),
}
