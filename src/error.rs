//! Error types
//!
//! GPU setup and per-frame surface failures surface as [`EngineError`];
//! texture generation failures as [`RasterError`], which callers degrade to a
//! blank atlas cell.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to create rendering surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    AdapterRequest(#[from] wgpu::RequestAdapterError),

    #[error("failed to open graphics device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("surface unavailable this frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("pipeline '{0}' is not available")]
    MissingPipeline(String),

    #[error("overlay rendering failed: {0}")]
    Overlay(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    #[error("cannot rasterize into a {width}x{height} surface")]
    EmptySurface { width: u32, height: u32 },

    #[error("atlas cell {cell} is outside a {capacity}-cell atlas")]
    CellOutOfRange { cell: usize, capacity: usize },
}
