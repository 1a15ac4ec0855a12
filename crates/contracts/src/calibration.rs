//! CalibrationProfile - ScanMapper input
//!
//! Vertical geometry of a multi-beam sensor, either a named preset or an
//! explicit linear range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Upper bound on configurable rings
pub const MAX_RING_COUNT: i64 = 4096;

/// Built-in sensor geometries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VendorModel {
    /// Velodyne VLP-16 (16 rings, ±15°)
    #[serde(rename = "VLP-16")]
    Vlp16,
    /// Velodyne HDL-32E (32 rings, -30.67° .. +10.67°)
    #[serde(rename = "HDL-32")]
    Hdl32,
    /// Velodyne HDL-64E (64 rings, two laser blocks)
    #[serde(rename = "HDL-64E")]
    Hdl64e,
}

impl VendorModel {
    /// All supported presets
    pub const ALL: [VendorModel; 3] = [Self::Vlp16, Self::Hdl32, Self::Hdl64e];

    /// Configuration name of the preset
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vlp16 => "VLP-16",
            Self::Hdl32 => "HDL-32",
            Self::Hdl64e => "HDL-64E",
        }
    }

    /// Number of rings of the preset
    pub fn ring_count(&self) -> usize {
        match self {
            Self::Vlp16 => 16,
            Self::Hdl32 => 32,
            Self::Hdl64e => 64,
        }
    }
}

impl fmt::Display for VendorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VendorModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.name() == s)
            .ok_or_else(|| ConfigError::UnknownModel { name: s.to_string() })
    }
}

/// Resolved calibration source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationProfile {
    /// One of the built-in sensor geometries
    VendorPreset { model: VendorModel },

    /// Linear mapping between two vertical angles (degrees)
    Explicit {
        min_angle: f64,
        max_angle: f64,
        ring_count: i64,
    },
}

impl CalibrationProfile {
    /// Preset profile from a configuration name
    ///
    /// # Errors
    /// `ConfigError::UnknownModel` for anything but the three preset names
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        Ok(Self::VendorPreset {
            model: name.parse()?,
        })
    }

    /// Explicit linear profile (validated by `ScanMapper::configure`)
    pub fn explicit(min_angle: f64, max_angle: f64, ring_count: i64) -> Self {
        Self::Explicit {
            min_angle,
            max_angle,
            ring_count,
        }
    }
}

impl fmt::Display for CalibrationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VendorPreset { model } => write!(f, "preset {model}"),
            Self::Explicit {
                min_angle,
                max_angle,
                ring_count,
            } => write!(
                f,
                "linear {min_angle}° .. {max_angle}° with {ring_count} rings"
            ),
        }
    }
}
