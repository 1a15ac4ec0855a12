//! Scan metrics
//!
//! Prometheus recording of dispatched scans plus an in-memory aggregator for
//! run summaries.

use contracts::RingScan;
use metrics::{counter, gauge, histogram};

/// Record metrics for one dispatched scan
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_scan_metrics;
///
/// while let Some(scan) = scans.recv().await {
///     record_scan_metrics(&scan);
///     // ...
/// }
/// ```
pub fn record_scan_metrics(scan: &RingScan) {
    counter!("ringscan_scans_dispatched_total").increment(1);
    gauge!("ringscan_last_scan_id").set(scan.scan_id as f64);

    let stats = &scan.stats;
    histogram!("ringscan_scan_points").record(f64::from(stats.points_assigned));

    if stats.out_of_fov > 0 {
        counter!("ringscan_points_out_of_fov_total").increment(u64::from(stats.out_of_fov));
    }
    if stats.invalid > 0 {
        counter!("ringscan_points_invalid_total").increment(u64::from(stats.invalid));
    }

    gauge!("ringscan_empty_rings").set(scan.empty_rings() as f64);
}

/// Record the interval between consecutive scan timestamps
pub fn record_scan_interval_ms(interval_ms: f64) {
    histogram!("ringscan_scan_interval_ms").record(interval_ms);
}

/// Record the scan channel depth between worker and dispatcher
pub fn record_scan_queue_depth(depth: usize) {
    gauge!("ringscan_scan_queue_depth").set(depth as f64);
}

/// Scan metrics aggregator
///
/// Aggregates in memory for the end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct ScanMetricsAggregator {
    /// Scans seen
    pub total_scans: u64,

    /// Points assigned to rings
    pub total_points: u64,

    /// Points outside the field of view
    pub total_out_of_fov: u64,

    /// Non-finite or near-origin points
    pub total_invalid: u64,

    /// Scans with at least one empty ring
    pub scans_with_empty_rings: u64,

    /// Assigned points per scan
    pub points_stats: RunningStats,

    /// Empty rings per scan
    pub empty_ring_stats: RunningStats,

    /// Interval between consecutive scans (ms)
    pub interval_stats: RunningStats,

    /// Points per ring, summed over all scans
    pub ring_totals: Vec<u64>,

    last_timestamp: Option<f64>,
}

impl ScanMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update aggregate statistics
    pub fn update(&mut self, scan: &RingScan) {
        let stats = &scan.stats;
        self.total_scans += 1;
        self.total_points += u64::from(stats.points_assigned);
        self.total_out_of_fov += u64::from(stats.out_of_fov);
        self.total_invalid += u64::from(stats.invalid);

        let empty = scan.empty_rings();
        if empty > 0 {
            self.scans_with_empty_rings += 1;
        }
        self.empty_ring_stats.push(empty as f64);
        self.points_stats.push(f64::from(stats.points_assigned));

        if let Some(last) = self.last_timestamp {
            self.interval_stats.push((scan.timestamp - last) * 1000.0);
        }
        self.last_timestamp = Some(scan.timestamp);

        if self.ring_totals.len() < scan.rings.len() {
            self.ring_totals.resize(scan.rings.len(), 0);
        }
        for group in &scan.rings {
            self.ring_totals[group.ring] += group.len() as u64;
        }
    }

    /// Generate summary report
    pub fn summary(&self) -> MetricsSummary {
        let seen = self.total_points + self.total_out_of_fov + self.total_invalid;
        MetricsSummary {
            total_scans: self.total_scans,
            total_points: self.total_points,
            total_out_of_fov: self.total_out_of_fov,
            total_invalid: self.total_invalid,
            scans_with_empty_rings: self.scans_with_empty_rings,
            out_of_fov_rate: if seen > 0 {
                self.total_out_of_fov as f64 / seen as f64 * 100.0
            } else {
                0.0
            },
            points_per_scan: StatsSummary::from(&self.points_stats),
            empty_rings: StatsSummary::from(&self.empty_ring_stats),
            scan_interval_ms: StatsSummary::from(&self.interval_stats),
            ring_totals: self.ring_totals.clone(),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_scans: u64,
    pub total_points: u64,
    pub total_out_of_fov: u64,
    pub total_invalid: u64,
    pub scans_with_empty_rings: u64,
    /// Percentage of valid-coordinate points outside the field of view
    pub out_of_fov_rate: f64,
    pub points_per_scan: StatsSummary,
    pub empty_rings: StatsSummary,
    pub scan_interval_ms: StatsSummary,
    pub ring_totals: Vec<u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Scan Metrics Summary ===")?;
        writeln!(f, "Total scans: {}", self.total_scans)?;
        writeln!(f, "Assigned points: {}", self.total_points)?;
        writeln!(
            f,
            "Out-of-FOV points: {} ({:.2}%)",
            self.total_out_of_fov, self.out_of_fov_rate
        )?;
        writeln!(f, "Invalid points: {}", self.total_invalid)?;
        writeln!(
            f,
            "Scans with empty rings: {}",
            self.scans_with_empty_rings
        )?;
        writeln!(f, "Points per scan: {}", self.points_per_scan)?;
        writeln!(f, "Empty rings per scan: {}", self.empty_rings)?;
        writeln!(f, "Scan interval (ms): {}", self.scan_interval_ms)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
