//! ScanMapper - vertical angle to ring index

use contracts::{
    CalibrationConfig, CalibrationProfile, ConfigError, VendorModel, MAX_RING_COUNT,
};
use tracing::{info, instrument, warn};

use crate::presets;

/// Resolved ring geometry
#[derive(Debug, Clone)]
enum RingGeometry {
    /// Evenly spaced rings between two angles
    Linear {
        min_angle: f64,
        max_angle: f64,
        ring_count: usize,
        /// Rings per degree: `(ring_count - 1) / (max - min)`
        factor: f64,
    },

    /// Per-ring angle table (ascending) with field-of-view limits
    Table {
        angles: Vec<f64>,
        /// Lowest accepted angle: first ring minus half the local pitch
        lower_limit: f64,
        /// Highest accepted angle: last ring plus half the local pitch
        upper_limit: f64,
    },
}

/// Maps a point's vertical angle to the ring that produced it
///
/// Immutable after construction; `ring_for_angle` only reads, so a mapper can
/// be shared across threads (e.g. behind an `Arc`) without locking.
#[derive(Debug, Clone)]
pub struct ScanMapper {
    profile: CalibrationProfile,
    geometry: RingGeometry,
}

impl ScanMapper {
    /// Build a mapper from a calibration profile
    ///
    /// # Errors
    /// - `InvalidRange` if `min_angle >= max_angle` or either bound is not finite
    /// - `InvalidRingCount` if the ring count is below 2 or above `MAX_RING_COUNT`
    #[instrument(name = "scan_mapper_configure", skip_all, fields(profile = %profile))]
    pub fn configure(profile: CalibrationProfile) -> Result<Self, ConfigError> {
        let geometry = match profile {
            CalibrationProfile::VendorPreset { model } => {
                let geometry = Self::table_geometry(model);
                info!(model = %model, rings = model.ring_count(), "set preset scan mapper");
                geometry
            }
            CalibrationProfile::Explicit {
                min_angle,
                max_angle,
                ring_count,
            } => {
                let geometry = Self::linear_geometry(min_angle, max_angle, ring_count)?;
                info!(
                    min_angle,
                    max_angle,
                    rings = ring_count,
                    "set linear scan mapper"
                );
                geometry
            }
        };

        Ok(Self { profile, geometry })
    }

    /// Resolve raw calibration parameters and build a mapper
    ///
    /// Logs a warning when the default preset is substituted.
    pub fn from_config(config: &CalibrationConfig) -> Result<Self, ConfigError> {
        let resolved = config.resolve()?;
        if resolved.defaulted {
            warn!(
                profile = %resolved.profile,
                "no calibration configured, default registration model will be used"
            );
        }
        Self::configure(resolved.profile)
    }

    fn linear_geometry(
        min_angle: f64,
        max_angle: f64,
        ring_count: i64,
    ) -> Result<RingGeometry, ConfigError> {
        let invalid_range = ConfigError::InvalidRange {
            min: min_angle,
            max: max_angle,
        };
        if !(min_angle.is_finite() && max_angle.is_finite()) || min_angle >= max_angle {
            return Err(invalid_range);
        }
        if !(2..=MAX_RING_COUNT).contains(&ring_count) {
            return Err(ConfigError::InvalidRingCount { count: ring_count });
        }

        let ring_count = ring_count as usize;
        // Span and factor must both be finite for max_angle to land on the top ring
        let factor = (ring_count - 1) as f64 / (max_angle - min_angle);
        if !factor.is_finite() || factor == 0.0 {
            return Err(invalid_range);
        }

        Ok(RingGeometry::Linear {
            min_angle,
            max_angle,
            ring_count,
            factor,
        })
    }

    fn table_geometry(model: VendorModel) -> RingGeometry {
        let angles = presets::ring_angles(model);
        let n = angles.len();
        let lower_pitch = angles[1] - angles[0];
        let upper_pitch = angles[n - 1] - angles[n - 2];

        RingGeometry::Table {
            lower_limit: angles[0] - lower_pitch / 2.0,
            upper_limit: angles[n - 1] + upper_pitch / 2.0,
            angles,
        }
    }

    /// The profile this mapper was built from
    pub fn profile(&self) -> CalibrationProfile {
        self.profile
    }

    /// Total configured rings
    pub fn ring_count(&self) -> usize {
        match &self.geometry {
            RingGeometry::Linear { ring_count, .. } => *ring_count,
            RingGeometry::Table { angles, .. } => angles.len(),
        }
    }

    /// Ring index for a vertical angle in degrees
    ///
    /// Returns `None` for angles outside the calibrated field of view; such
    /// points are never clamped onto an edge ring. Non-finite angles also
    /// map to `None`.
    #[inline]
    pub fn ring_for_angle(&self, angle: f64) -> Option<usize> {
        if !angle.is_finite() {
            return None;
        }

        match &self.geometry {
            RingGeometry::Linear {
                min_angle,
                ring_count,
                factor,
                ..
            } => {
                let index = ((angle - min_angle) * factor).round();
                if index < 0.0 || index > (*ring_count - 1) as f64 {
                    None
                } else {
                    Some(index as usize)
                }
            }
            RingGeometry::Table {
                angles,
                lower_limit,
                upper_limit,
            } => {
                if angle < *lower_limit || angle > *upper_limit {
                    return None;
                }
                Some(nearest_ring(angles, angle))
            }
        }
    }

    /// Nominal elevation of a ring in degrees
    pub fn ring_angle(&self, ring: usize) -> Option<f64> {
        match &self.geometry {
            RingGeometry::Linear {
                min_angle,
                ring_count,
                factor,
                ..
            } => (ring < *ring_count).then(|| min_angle + ring as f64 / factor),
            RingGeometry::Table { angles, .. } => angles.get(ring).copied(),
        }
    }

    /// Lowest and highest nominal ring elevation (degrees)
    pub fn vertical_fov(&self) -> (f64, f64) {
        match &self.geometry {
            RingGeometry::Linear {
                min_angle,
                max_angle,
                ..
            } => (*min_angle, *max_angle),
            RingGeometry::Table { angles, .. } => (angles[0], angles[angles.len() - 1]),
        }
    }
}

/// Index of the table entry closest to `angle`; ties go to the lower ring
fn nearest_ring(angles: &[f64], angle: f64) -> usize {
    let upper = angles.partition_point(|&a| a < angle);
    if upper == 0 {
        return 0;
    }
    if upper == angles.len() {
        return angles.len() - 1;
    }

    let lower = upper - 1;
    if angle - angles[lower] <= angles[upper] - angle {
        lower
    } else {
        upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn linear(min: f64, max: f64, rings: i64) -> ScanMapper {
        ScanMapper::configure(CalibrationProfile::explicit(min, max, rings)).unwrap()
    }

    fn preset(model: VendorModel) -> ScanMapper {
        ScanMapper::configure(CalibrationProfile::VendorPreset { model }).unwrap()
    }

    #[test]
    fn test_linear_boundaries_exact() {
        for rings in [2, 3, 16, 32, 64, 128] {
            let mapper = linear(-24.9, 2.0, rings);
            assert_eq!(mapper.ring_for_angle(-24.9), Some(0));
            assert_eq!(mapper.ring_for_angle(2.0), Some(rings as usize - 1));
        }
    }

    #[test]
    fn test_linear_reference_example() {
        let mapper = linear(-15.0, 15.0, 16);
        let rings: Vec<_> = [-15.0, -13.0, 0.0, 15.0]
            .iter()
            .map(|&a| mapper.ring_for_angle(a))
            .collect();
        assert_eq!(rings, vec![Some(0), Some(1), Some(8), Some(15)]);
    }

    #[test]
    fn test_linear_out_of_fov_not_clamped() {
        let mapper = linear(-15.0, 15.0, 16);
        // pitch is 2°, so half a pitch is 1°
        assert_eq!(mapper.ring_for_angle(-15.9), Some(0));
        assert_eq!(mapper.ring_for_angle(-16.1), None);
        assert_eq!(mapper.ring_for_angle(15.9), Some(15));
        assert_eq!(mapper.ring_for_angle(16.1), None);
        assert_eq!(mapper.ring_for_angle(-90.0), None);
        assert_eq!(mapper.ring_for_angle(90.0), None);
    }

    #[test]
    fn test_non_finite_angle() {
        let mapper = linear(-15.0, 15.0, 16);
        assert_eq!(mapper.ring_for_angle(f64::NAN), None);
        assert_eq!(mapper.ring_for_angle(f64::INFINITY), None);
        assert_eq!(preset(VendorModel::Vlp16).ring_for_angle(f64::NAN), None);
    }

    #[test]
    fn test_linear_monotonic_and_idempotent() {
        let mut rng = rand::rng();
        let mapper = linear(-30.67, 10.67, 32);

        let mut angles: Vec<f64> = (0..2000).map(|_| rng.random_range(-35.0..15.0)).collect();
        angles.sort_by(f64::total_cmp);

        let mut last = None;
        for angle in angles {
            let ring = mapper.ring_for_angle(angle);
            assert_eq!(ring, mapper.ring_for_angle(angle));
            if let (Some(prev), Some(cur)) = (last, ring) {
                assert!(cur >= prev, "ring decreased at {angle}");
            }
            if ring.is_some() {
                last = ring;
            }
        }
    }

    #[test]
    fn test_invalid_range() {
        let err = ScanMapper::configure(CalibrationProfile::explicit(10.0, 5.0, 16)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidRange { min: 10.0, max: 5.0 });

        let err = ScanMapper::configure(CalibrationProfile::explicit(5.0, 5.0, 16)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));

        let err =
            ScanMapper::configure(CalibrationProfile::explicit(f64::NAN, 5.0, 16)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn test_unrepresentable_span_rejected() {
        // max - min overflows to infinity
        let err = ScanMapper::configure(CalibrationProfile::explicit(-1e308, 1e308, 16))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));

        // subnormal span makes the ring factor infinite
        let err =
            ScanMapper::configure(CalibrationProfile::explicit(0.0, 1e-320, 16)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));

        let mapper = linear(-1e300, 1e300, 16);
        assert_eq!(mapper.ring_for_angle(1e300), Some(15));
        assert_eq!(mapper.ring_for_angle(-1e300), Some(0));
    }

    #[test]
    fn test_invalid_ring_count() {
        for count in [-1, 0, 1, MAX_RING_COUNT + 1] {
            let err = ScanMapper::configure(CalibrationProfile::explicit(-15.0, 15.0, count))
                .unwrap_err();
            assert_eq!(err, ConfigError::InvalidRingCount { count });
        }
    }

    #[test]
    fn test_preset_ring_counts() {
        assert_eq!(preset(VendorModel::Vlp16).ring_count(), 16);
        assert_eq!(preset(VendorModel::Hdl32).ring_count(), 32);
        assert_eq!(preset(VendorModel::Hdl64e).ring_count(), 64);
    }

    #[test]
    fn test_preset_nominal_angles_map_to_own_ring() {
        for model in VendorModel::ALL {
            let mapper = preset(model);
            for ring in 0..mapper.ring_count() {
                let angle = mapper.ring_angle(ring).unwrap();
                assert_eq!(mapper.ring_for_angle(angle), Some(ring), "{model} ring {ring}");
            }
        }
    }

    #[test]
    fn test_preset_nearest_ring() {
        let mapper = preset(VendorModel::Vlp16);
        assert_eq!(mapper.ring_for_angle(-14.2), Some(0));
        assert_eq!(mapper.ring_for_angle(-13.8), Some(1));
        // midway between -15 and -13 goes to the lower ring
        assert_eq!(mapper.ring_for_angle(-14.0), Some(0));
        assert_eq!(mapper.ring_for_angle(0.3), Some(8));

        // HDL-32 two-decimal table: the -30.0 midpoint goes to the lower ring
        let mapper = preset(VendorModel::Hdl32);
        assert_eq!(mapper.ring_for_angle(-30.0), Some(0));
        assert_eq!(mapper.ring_for_angle(-30.01), Some(0));
        assert_eq!(mapper.ring_for_angle(-29.99), Some(1));
        assert_eq!(mapper.ring_for_angle(0.5), Some(23));
        assert_eq!(mapper.ring_for_angle(0.7), Some(24));
    }

    #[test]
    fn test_preset_fov_limits() {
        let mapper = preset(VendorModel::Vlp16);
        assert_eq!(mapper.ring_for_angle(-15.9), Some(0));
        assert_eq!(mapper.ring_for_angle(-16.1), None);
        assert_eq!(mapper.ring_for_angle(15.9), Some(15));
        assert_eq!(mapper.ring_for_angle(16.1), None);

        // HDL-64E edges use the local pitch of each block
        let mapper = preset(VendorModel::Hdl64e);
        assert_eq!(mapper.ring_for_angle(-24.55), Some(0));
        assert_eq!(mapper.ring_for_angle(-24.65), None);
        assert_eq!(mapper.ring_for_angle(2.15), Some(63));
        assert_eq!(mapper.ring_for_angle(2.2), None);

        // HDL-32 pitch is about 1.34°, so the edges sit about 0.67° out
        let mapper = preset(VendorModel::Hdl32);
        assert_eq!(mapper.ring_for_angle(-31.3), Some(0));
        assert_eq!(mapper.ring_for_angle(-31.4), None);
        assert_eq!(mapper.ring_for_angle(11.3), Some(31));
        assert_eq!(mapper.ring_for_angle(11.4), None);
    }

    #[test]
    fn test_preset_monotonic() {
        let mapper = preset(VendorModel::Hdl64e);
        let mut last = 0;
        let mut angle = -24.5;
        while angle < 2.1 {
            let ring = mapper.ring_for_angle(angle).unwrap();
            assert!(ring >= last);
            last = ring;
            angle += 0.01;
        }
        assert_eq!(last, 63);
    }

    #[test]
    fn test_ring_angle_linear() {
        let mapper = linear(-15.0, 15.0, 16);
        assert_eq!(mapper.ring_angle(0), Some(-15.0));
        assert!((mapper.ring_angle(1).unwrap() + 13.0).abs() < 1e-9);
        assert!((mapper.ring_angle(15).unwrap() - 15.0).abs() < 1e-9);
        assert_eq!(mapper.ring_angle(16), None);
        assert_eq!(mapper.vertical_fov(), (-15.0, 15.0));
    }

    #[test]
    fn test_from_config_default_fallback() {
        let config = CalibrationConfig {
            allow_default_model: true,
            ..Default::default()
        };
        let mapper = ScanMapper::from_config(&config).unwrap();
        assert_eq!(mapper.ring_count(), 16);

        let err = ScanMapper::from_config(&CalibrationConfig::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingCalibration);
    }

    #[test]
    fn test_mapper_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScanMapper>();
    }
}
