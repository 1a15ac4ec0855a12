//! IngestionController
//!
//! Owns the frame lifecycle: warm-up skip, per-point ring assignment and
//! assembly of the ring-grouped dispatch unit.

use std::sync::Arc;

use contracts::{Frame, IngestionConfig, RingGroup, RingScan, ScanStats};
use scan_mapper::ScanMapper;
use tracing::{debug, info, trace};

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Startup frames still to be discarded (always >= 1)
    WarmingUp { remaining: u32 },
    /// Every frame is dispatched
    Active,
}

/// Result of feeding one frame to the controller
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Frame consumed by warm-up, nothing emitted
    Skipped,
    /// Ring-grouped frame ready for registration
    Dispatched(RingScan),
}

impl DispatchOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Extract the scan, if any
    pub fn into_scan(self) -> Option<RingScan> {
        match self {
            Self::Skipped => None,
            Self::Dispatched(scan) => Some(scan),
        }
    }
}

/// Frame ingestion controller
///
/// `on_frame` takes `&mut self`, so a controller processes one frame at a
/// time. The mapper is shared read-only.
#[derive(Debug)]
pub struct IngestionController {
    mapper: Arc<ScanMapper>,
    state: ControllerState,
    min_point_range: f64,
    next_scan_id: u64,
}

impl IngestionController {
    /// Create a controller that skips the first `warmup_frames` frames
    pub fn new(mapper: Arc<ScanMapper>, warmup_frames: u32) -> Self {
        let state = match warmup_frames {
            0 => ControllerState::Active,
            remaining => ControllerState::WarmingUp { remaining },
        };
        info!(
            ring_count = mapper.ring_count(),
            warmup_frames, "ingestion controller created"
        );
        Self {
            mapper,
            state,
            min_point_range: 0.0,
            next_scan_id: 0,
        }
    }

    /// Create a controller from the `[ingestion]` section
    pub fn from_config(mapper: Arc<ScanMapper>, config: &IngestionConfig) -> Self {
        Self::new(mapper, config.warmup_frames).with_min_point_range(config.min_point_range)
    }

    /// Discard points closer than `range` metres to the origin
    pub fn with_min_point_range(mut self, range: f64) -> Self {
        self.min_point_range = range;
        self
    }

    /// Process one frame
    ///
    /// Never fails: out-of-FOV and invalid points are dropped and counted in
    /// the scan stats.
    pub fn on_frame(&mut self, frame: Frame) -> DispatchOutcome {
        if let ControllerState::WarmingUp { remaining } = self.state {
            let remaining = remaining - 1;
            self.state = if remaining == 0 {
                info!("warm-up complete, dispatching frames");
                ControllerState::Active
            } else {
                ControllerState::WarmingUp { remaining }
            };
            trace!(
                timestamp = frame.timestamp,
                remaining, "frame skipped during warm-up"
            );
            return DispatchOutcome::Skipped;
        }

        DispatchOutcome::Dispatched(self.assemble(frame))
    }

    fn assemble(&mut self, frame: Frame) -> RingScan {
        let mut rings: Vec<RingGroup> = (0..self.mapper.ring_count()).map(RingGroup::new).collect();
        let mut stats = ScanStats {
            points_in: frame.points.len() as u32,
            ..Default::default()
        };

        for point in frame.points {
            if !point.is_finite() || point.range() < self.min_point_range {
                stats.invalid += 1;
                continue;
            }
            match self.mapper.ring_for_angle(point.vertical_angle_deg()) {
                Some(ring) => {
                    rings[ring].points.push(point);
                    stats.points_assigned += 1;
                }
                None => stats.out_of_fov += 1,
            }
        }

        let scan_id = self.next_scan_id;
        self.next_scan_id += 1;

        debug!(
            scan_id,
            timestamp = frame.timestamp,
            points_in = stats.points_in,
            assigned = stats.points_assigned,
            out_of_fov = stats.out_of_fov,
            invalid = stats.invalid,
            "frame dispatched"
        );

        RingScan {
            timestamp: frame.timestamp,
            scan_id,
            frame_id: frame.frame_id,
            rings,
            stats,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Frames still to be skipped (0 once active)
    pub fn warmup_remaining(&self) -> u32 {
        match self.state {
            ControllerState::WarmingUp { remaining } => remaining,
            ControllerState::Active => 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == ControllerState::Active
    }

    pub fn mapper(&self) -> &Arc<ScanMapper> {
        &self.mapper
    }

    /// Scans emitted so far
    pub fn dispatched_count(&self) -> u64 {
        self.next_scan_id
    }
}
