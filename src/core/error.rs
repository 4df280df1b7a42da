//! Error types for the application loop and configuration

use std::path::PathBuf;

/// Errors raised while bringing up the window and GPU
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The winit event loop could not be created or exited abnormally
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// The OS refused to create the window
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    /// wgpu could not create a surface for the window
    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    /// No adapter is compatible with the window surface
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    /// The adapter refused the device request
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Errors raised while loading the viewer configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid RON for [`super::ViewerConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
