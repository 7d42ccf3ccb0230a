//! Error types
//!
//! Setup failures only; the per-frame path reports `wgpu::SurfaceError` directly.

/// Errors raised while building the scene description
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// A label points at a planet that does not exist
    #[error("label '{text}' targets planet {target}, but only {count} planets exist")]
    LabelTarget {
        text: String,
        target: usize,
        count: usize,
    },
}

/// Errors raised while bringing up the GPU renderer
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    /// Texture upload with mismatched dimensions
    #[error("texture data size ({actual}) does not match {width}x{height} RGBA8")]
    TextureSize {
        actual: usize,
        width: u32,
        height: u32,
    },
}
