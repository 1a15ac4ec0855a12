//! Frame - transport input
//!
//! One full sensor revolution as delivered by the transport collaborator.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One returned range measurement in sensor frame (metres)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PointSample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal distance from the sensor axis
    #[inline]
    pub fn planar_range(&self) -> f64 {
        let (x, y) = (f64::from(self.x), f64::from(self.y));
        (x * x + y * y).sqrt()
    }

    /// Euclidean distance from the sensor origin
    #[inline]
    pub fn range(&self) -> f64 {
        let z = f64::from(self.z);
        (self.planar_range().powi(2) + z * z).sqrt()
    }

    /// Elevation above the sensor's horizontal plane, in degrees
    #[inline]
    pub fn vertical_angle_deg(&self) -> f64 {
        f64::from(self.z).atan2(self.planar_range()).to_degrees()
    }

    /// All three coordinates are finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Sensor frame
///
/// Points are kept in original scan order; downstream stages infer relative
/// point timing from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Capture timestamp (seconds) - primary clock
    pub timestamp: f64,

    /// Optional transport sequence number (for ordering/diagnostics)
    pub frame_id: Option<u64>,

    /// Points in arrival order
    pub points: Vec<PointSample>,
}

impl Frame {
    pub fn new(timestamp: f64, points: Vec<PointSample>) -> Self {
        Self {
            timestamp,
            frame_id: None,
            points,
        }
    }

    /// Attach a transport sequence number
    pub fn with_frame_id(mut self, frame_id: u64) -> Self {
        self.frame_id = Some(frame_id);
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Undecoded point cloud as received on the wire
///
/// Each point starts with little-endian `x, y, z: f32`; the remaining
/// `point_stride - 12` bytes carry extra channels (usually intensity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPointCloud {
    /// Point count
    pub num_points: u32,

    /// Bytes per point (typically 16: x, y, z, intensity)
    pub point_stride: u32,

    /// Point data
    pub data: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_angle() {
        let level = PointSample::new(10.0, 0.0, 0.0);
        assert!(level.vertical_angle_deg().abs() < 1e-9);

        let up = PointSample::new(0.0, 1.0, 1.0);
        assert!((up.vertical_angle_deg() - 45.0).abs() < 1e-6);

        let down = PointSample::new(-1.0, 0.0, -1.0);
        assert!((down.vertical_angle_deg() + 45.0).abs() < 1e-6);
    }

    #[test]
    fn test_range_and_finite() {
        let p = PointSample::new(3.0, 4.0, 12.0);
        assert!((p.planar_range() - 5.0).abs() < 1e-9);
        assert!((p.range() - 13.0).abs() < 1e-9);
        assert!(p.is_finite());
        assert!(!PointSample::new(f32::NAN, 0.0, 0.0).is_finite());
    }

    #[test]
    fn test_frame_builder() {
        let frame = Frame::new(1.5, vec![PointSample::default()]).with_frame_id(7);
        assert_eq!(frame.frame_id, Some(7));
        assert_eq!(frame.len(), 1);
        assert!(!frame.is_empty());
    }
}
