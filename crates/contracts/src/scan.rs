//! RingScan - Ingestion output
//!
//! Ring-grouped frame handed to the registration stage.

use serde::{Deserialize, Serialize};

use crate::PointSample;

/// Points of one frame assigned to a single ring, in scan order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RingGroup {
    /// Ring index (0 = lowest elevation)
    pub ring: usize,

    /// Points in arrival order
    pub points: Vec<PointSample>,
}

impl RingGroup {
    pub fn new(ring: usize) -> Self {
        Self {
            ring,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Per-frame point accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Points in the incoming frame
    pub points_in: u32,

    /// Points assigned to a ring
    pub points_assigned: u32,

    /// Points outside the calibrated field of view
    pub out_of_fov: u32,

    /// Non-finite or near-origin points
    pub invalid: u32,
}

/// Dispatch unit for one non-skipped frame
///
/// `rings` always holds exactly `ring_count` groups, indexed by ring, so
/// downstream indexing stays stable across frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingScan {
    /// Capture timestamp of the source frame (seconds)
    pub timestamp: f64,

    /// Dispatch sequence number (monotonically increasing)
    pub scan_id: u64,

    /// Transport sequence number of the source frame
    pub frame_id: Option<u64>,

    /// One group per ring
    pub rings: Vec<RingGroup>,

    /// Point accounting
    pub stats: ScanStats,
}

impl RingScan {
    /// Number of rings (equals the mapper's ring count)
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Total points across all rings
    pub fn point_count(&self) -> usize {
        self.rings.iter().map(RingGroup::len).sum()
    }

    /// Rings that received no point in this frame
    pub fn empty_rings(&self) -> usize {
        self.rings.iter().filter(|r| r.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_counts() {
        let mut rings: Vec<RingGroup> = (0..4).map(RingGroup::new).collect();
        rings[1].points.push(PointSample::new(1.0, 0.0, 0.0));
        rings[3].points.push(PointSample::new(2.0, 0.0, 0.0));
        rings[3].points.push(PointSample::new(3.0, 0.0, 0.0));

        let scan = RingScan {
            timestamp: 0.1,
            scan_id: 1,
            frame_id: None,
            rings,
            stats: ScanStats::default(),
        };

        assert_eq!(scan.ring_count(), 4);
        assert_eq!(scan.point_count(), 3);
        assert_eq!(scan.empty_rings(), 2);
    }
}
