//! Error types for the evolution core.

use thiserror::Error;

/// Everything the core can report to its host.
///
/// Numeric clamps on shapes are not errors; they happen silently after every
/// mutation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvolveError {
    /// Rejected configuration value (never silently clamped)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Two rasters that must share dimensions don't
    #[error("Raster size mismatch: expected {expected:?}, got {actual:?}")]
    RasterSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Not enough individuals to run a tournament or breed
    #[error("Not enough individuals: need {required}, have {available}")]
    EmptyPopulation { required: usize, available: usize },

    /// Pixel buffer doesn't match its declared dimensions
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    /// Configuration JSON couldn't be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration file couldn't be read
    #[error("Failed to read configuration: {0}")]
    ConfigIo(String),
}

/// Result alias used throughout the crate
pub type EvolveResult<T> = Result<T, EvolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvolveError::InvalidConfiguration("survive_fraction must be in (0, 1]".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: survive_fraction must be in (0, 1]"
        );

        let err = EvolveError::RasterSizeMismatch { expected: (200, 200), actual: (100, 50) };
        assert_eq!(err.to_string(), "Raster size mismatch: expected (200, 200), got (100, 50)");

        let err = EvolveError::EmptyPopulation { required: 3, available: 1 };
        assert_eq!(err.to_string(), "Not enough individuals: need 3, have 1");
    }
}
