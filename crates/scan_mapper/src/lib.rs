//! # Scan Mapper
//!
//! Ring calibration: resolves a point's vertical angle to the laser channel
//! (ring) that produced it.
//!
//! Two geometries are supported:
//! - Linear: an explicit `(min_angle, max_angle, ring_count)` range, rings
//!   evenly spaced, index obtained by rounding
//! - Preset: per-ring elevation tables of the VLP-16, HDL-32 and HDL-64E,
//!   nearest ring by angular distance
//!
//! ## Usage Example
//!
//! ```
//! use contracts::CalibrationProfile;
//! use scan_mapper::ScanMapper;
//!
//! let mapper = ScanMapper::configure(CalibrationProfile::explicit(-15.0, 15.0, 16)).unwrap();
//! assert_eq!(mapper.ring_for_angle(-13.0), Some(1));
//! assert_eq!(mapper.ring_for_angle(40.0), None);
//! ```

mod mapper;
mod presets;

pub use contracts::{CalibrationProfile, ConfigError, VendorModel};
pub use mapper::ScanMapper;
