//! Layered error definitions
//!
//! Categorized by source: calibration / config / sink

use thiserror::Error;

/// Calibration resolution error
///
/// Every variant is fatal at startup: frame processing must not begin
/// until a calibration has been resolved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Sensor model name is not one of the built-in presets
    #[error("unknown lidar model '{name}' (only \"VLP-16\", \"HDL-32\" and \"HDL-64E\" are supported)")]
    UnknownModel { name: String },

    /// Vertical range is empty, inverted or non-finite
    #[error("invalid vertical range: min ({min}) must be < max ({max})")]
    InvalidRange { min: f64, max: f64 },

    /// Ring count outside `2..=MAX_RING_COUNT`
    #[error("invalid number of scan rings: {count} (must be >= 2 and <= {max})", max = crate::MAX_RING_COUNT)]
    InvalidRingCount { count: i64 },

    /// Neither a model name nor an explicit range was given
    #[error("no calibration configured: set 'lidar_model' or all of 'min_vertical_angle', 'max_vertical_angle', 'n_scan_rings'")]
    MissingCalibration,

    /// Explicit range given only partially
    #[error("incomplete explicit calibration, missing: {missing:?}")]
    IncompleteCalibration { missing: Vec<&'static str> },

    /// Both a model name and explicit range fields were given
    #[error("ambiguous calibration: 'lidar_model' cannot be combined with explicit range fields {explicit:?}")]
    AmbiguousCalibration { explicit: Vec<&'static str> },
}

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Calibration could not be resolved
    #[error("calibration error: {0}")]
    Calibration(#[from] ConfigError),

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_message_names_presets() {
        let err = ConfigError::UnknownModel {
            name: "bad-model".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bad-model"));
        assert!(msg.contains("VLP-16"));
    }

    #[test]
    fn test_calibration_error_converts() {
        let err: ContractError = ConfigError::InvalidRingCount { count: 1 }.into();
        assert!(matches!(err, ContractError::Calibration(_)));
        assert!(err.to_string().contains(">= 2"));
    }
}
