// One error type for the whole pipeline.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The curve needs at least one full 4-point window.
    #[error("control points: need at least 4, got {0}")]
    TooFewControlPoints(usize),

    /// Opening/mapping the shared memory segment failed.
    #[error("failed to access shared memory '{name}'")]
    SharedMemoryUnavailable { name: String },

    /// The segment exists but cannot hold one frame of the configured size.
    #[error("shared memory '{name}': {available} bytes, {width}x{height} frame needs {required}")]
    SharedMemoryTooSmall {
        name: String,
        width: u32,
        height: u32,
        required: usize,
        available: usize,
    },

    #[error("frame buffer of {len} bytes does not match {width}x{height}x4")]
    FrameSize { width: u32, height: u32, len: usize },

    #[error("window init error: {0}")]
    WindowInit(String),

    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// The user closed the display window.
    #[error("window closed")]
    WindowClosed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
