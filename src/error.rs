//! Error types for the maze raycaster

use thiserror::Error;

/// Errors raised while building a level, its quality parameters or the window.
///
/// Per-frame operations never fail; everything here is a construction-time
/// misconfiguration or an I/O / windowing problem.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("ray count must be positive")]
    InvalidRayCount,

    #[error("max depth must be a positive finite number, got {0}")]
    InvalidMaxDepth(f64),

    #[error("field of view must be within [0, 180) degrees, got {0}")]
    InvalidFov(f64),

    #[error("march step must be within (0, 0.1] grid units, got {0}")]
    InvalidStep(f64),

    #[error("malformed maze grid: {0}")]
    MalformedGrid(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("window error: {0}")]
    Window(String),
}

impl From<toml::de::Error> for GameError {
    fn from(e: toml::de::Error) -> Self {
        GameError::Config(e.to_string())
    }
}

impl From<winit::error::EventLoopError> for GameError {
    fn from(e: winit::error::EventLoopError) -> Self {
        GameError::Window(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
