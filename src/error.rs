use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Rejected flock configuration.
///
/// Construction is the only fallible step. Once a `Flock` exists, degenerate
/// numerics (zero vectors, empty neighborhoods, overlapping boids) are handled
/// in place and never surface as errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("cell size must be finite and > 0, got {0}")]
    InvalidCellSize(f32),

    #[error("max speed must be finite and > 0, got {0}")]
    InvalidMaxSpeed(f32),

    #[error("max force must be finite and >= 0, got {0}")]
    InvalidMaxForce(f32),

    #[error("world size must be finite and > 0, got {width}x{height}")]
    InvalidWorldSize { width: f32, height: f32 },

    #[error("initial velocity range must satisfy 0 <= min <= max, got {min}..{max}")]
    InvalidVelocityRange { min: f32, max: f32 },

    #[error("cell size {cell_size} needs more than {max} cells to cover a {width}x{height} world")]
    GridTooLarge {
        cell_size: f32,
        width: f32,
        height: f32,
        max: usize,
    },

    #[error("color palette is empty")]
    EmptyPalette,

    #[error("invalid hex color {0:?}")]
    InvalidColor(String),

    /// Any other out-of-range parameter.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
