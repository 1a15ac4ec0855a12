//! PipelineBlueprint - Config Loader output
//!
//! Describes the full pipeline configuration: calibration, ingestion policy,
//! synthetic source and output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CalibrationProfile, ConfigError, VendorModel};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Ring calibration parameters
    pub calibration: CalibrationConfig,

    /// Warm-up and backpressure policy
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Synthetic frame source (used when no real transport is attached)
    #[serde(default)]
    pub source: SourceConfig,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Raw calibration parameters
///
/// Exactly one form must be fully specified: `lidar_model`, or all three of
/// `min_vertical_angle`, `max_vertical_angle` and `n_scan_rings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Preset name ("VLP-16", "HDL-32", "HDL-64E")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lidar_model: Option<String>,

    /// Lowest ring elevation (degrees)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_vertical_angle: Option<f64>,

    /// Highest ring elevation (degrees)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_vertical_angle: Option<f64>,

    /// Number of rings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_scan_rings: Option<i64>,

    /// Fall back to VLP-16 (with a warning) when nothing is configured
    #[serde(default)]
    pub allow_default_model: bool,
}

/// Calibration profile together with how it was obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCalibration {
    pub profile: CalibrationProfile,

    /// True when `allow_default_model` substituted the default preset
    pub defaulted: bool,
}

/// Preset used by `allow_default_model`
pub const DEFAULT_VENDOR_MODEL: VendorModel = VendorModel::Vlp16;

impl CalibrationConfig {
    /// Preset calibration
    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            lidar_model: Some(name.into()),
            ..Default::default()
        }
    }

    /// Explicit linear calibration
    pub fn explicit(min_angle: f64, max_angle: f64, ring_count: i64) -> Self {
        Self {
            min_vertical_angle: Some(min_angle),
            max_vertical_angle: Some(max_angle),
            n_scan_rings: Some(ring_count),
            ..Default::default()
        }
    }

    /// Pick exactly one calibration form
    ///
    /// Only the form is checked here; range and ring count validity is
    /// checked when the mapper is configured.
    ///
    /// # Errors
    /// - `UnknownModel` for an unrecognized preset name
    /// - `AmbiguousCalibration` when both forms are present
    /// - `IncompleteCalibration` when the explicit triple is partial
    /// - `MissingCalibration` when nothing is set and no fallback is allowed
    pub fn resolve(&self) -> Result<ResolvedCalibration, ConfigError> {
        let explicit_set: Vec<&'static str> = self
            .explicit_fields()
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect();

        if let Some(name) = &self.lidar_model {
            if !explicit_set.is_empty() {
                return Err(ConfigError::AmbiguousCalibration {
                    explicit: explicit_set,
                });
            }
            return Ok(ResolvedCalibration {
                profile: CalibrationProfile::preset(name)?,
                defaulted: false,
            });
        }

        match (
            self.min_vertical_angle,
            self.max_vertical_angle,
            self.n_scan_rings,
        ) {
            (Some(min), Some(max), Some(rings)) => Ok(ResolvedCalibration {
                profile: CalibrationProfile::explicit(min, max, rings),
                defaulted: false,
            }),
            (None, None, None) if self.allow_default_model => Ok(ResolvedCalibration {
                profile: CalibrationProfile::VendorPreset {
                    model: DEFAULT_VENDOR_MODEL,
                },
                defaulted: true,
            }),
            (None, None, None) => Err(ConfigError::MissingCalibration),
            _ => Err(ConfigError::IncompleteCalibration {
                missing: self
                    .explicit_fields()
                    .into_iter()
                    .filter_map(|(name, set)| (!set).then_some(name))
                    .collect(),
            }),
        }
    }

    fn explicit_fields(&self) -> [(&'static str, bool); 3] {
        [
            ("min_vertical_angle", self.min_vertical_angle.is_some()),
            ("max_vertical_angle", self.max_vertical_angle.is_some()),
            ("n_scan_rings", self.n_scan_rings.is_some()),
        ]
    }
}

/// Warm-up and backpressure configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Frames discarded at startup before any scan is dispatched
    #[serde(default = "default_warmup_frames")]
    pub warmup_frames: u32,

    /// Depth of the frame queue in front of the controller
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,

    /// Policy when the frame queue is full
    #[serde(default)]
    pub drop_policy: DropPolicy,

    /// Points closer than this to the sensor origin are discarded (metres)
    #[serde(default = "default_min_point_range")]
    pub min_point_range: f64,

    /// Capacity of the scan channel between controller and dispatcher
    #[serde(default = "default_output_capacity")]
    pub output_capacity: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            warmup_frames: default_warmup_frames(),
            queue_depth: default_queue_depth(),
            drop_policy: DropPolicy::default(),
            min_point_range: default_min_point_range(),
            output_capacity: default_output_capacity(),
        }
    }
}

fn default_warmup_frames() -> u32 {
    20
}

fn default_queue_depth() -> usize {
    2
}

fn default_min_point_range() -> f64 {
    0.01
}

fn default_output_capacity() -> usize {
    4
}

/// Drop policy (when the frame queue is full)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Evict the oldest queued frame
    #[default]
    DropOldest,
    /// Reject the incoming frame
    DropNewest,
}

/// Synthetic source parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Frame rate (Hz), must be > 0
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f64,

    /// Points per ring per revolution
    #[serde(default = "default_azimuth_steps")]
    pub azimuth_steps: u32,

    /// Range of every synthetic return (metres)
    #[serde(default = "default_range_m")]
    pub range_m: f64,

    /// Extra returns placed outside the field of view per frame
    #[serde(default = "default_out_of_fov_points")]
    pub out_of_fov_points: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            frequency_hz: default_frequency_hz(),
            azimuth_steps: default_azimuth_steps(),
            range_m: default_range_m(),
            out_of_fov_points: default_out_of_fov_points(),
        }
    }
}

fn default_frequency_hz() -> f64 {
    10.0
}

fn default_azimuth_steps() -> u32 {
    360
}

fn default_range_m() -> f64 {
    10.0
}

fn default_out_of_fov_points() -> u32 {
    8
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    8
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log summary
    Log,
    /// PLY + JSON files
    File,
    /// UDP datagrams
    Network,
    /// In-process hand-off to the registration stage
    Channel,
}
