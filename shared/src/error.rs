use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("world grid has no area ({width}x{height})")]
    EmptyGrid { width: u32, height: u32 },
    #[error("2d drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("territory renderer already disposed")]
    Disposed,
    #[error("invalid renderer config: {0}")]
    InvalidConfig(String),
}
