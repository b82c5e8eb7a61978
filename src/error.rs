//! Error types for startup, rendering and editor state

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures while bringing up the window, GPU or font.
/// Any of these ends the process with exit code 1.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("event loop could not be created: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window could not be created: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("surface could not be created: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("renderer could not be created: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface does not support the selected adapter")]
    SurfaceConfig,

    #[error("failed to read font {}: {source}", .path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load font {}: {reason}", .path.display())]
    FontParse { path: PathBuf, reason: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Per-draw failures. The draw is skipped for this frame only.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to rasterize")]
    EmptyText,

    #[error("rasterized image for {0:?} has zero size")]
    EmptyImage(String),

    #[error("text image of {width}x{height} pixels is too large")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("could not acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Rejected editor operations. State is left unchanged.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot open more files, maximum of {max} reached")]
    CapacityExceeded { max: usize },

    #[error("file name is {len} bytes, limit is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("no file is open")]
    NoActiveFile,

    #[error("failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
