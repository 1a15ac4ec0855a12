//! # Contracts
//!
//! Frozen interface contracts, defining inter-crate data structures and traits.
//! All business crates depend on this crate; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Frame capture timestamp (seconds, f64) is the primary clock
//! - `frame_id` is optional, used for ordering/diagnostics
//!
//! ## Ring Model
//! - Ring 0 is the lowest-elevation laser channel
//! - A `RingScan` always carries one `RingGroup` per configured ring

mod blueprint;
mod calibration;
mod error;
mod frame;
mod frame_source;
mod scan;
mod sink;

pub use blueprint::*;
pub use calibration::{CalibrationProfile, VendorModel, MAX_RING_COUNT};
pub use error::*;
pub use frame::{Frame, PointSample, RawPointCloud};
pub use frame_source::{FrameCallback, FrameSource};
pub use scan::{RingGroup, RingScan, ScanStats};
pub use sink::*;
