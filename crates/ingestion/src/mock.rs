//! Mock frame source
//!
//! Synthetic rotating sensor for running without hardware. Each revolution
//! fires every ring once per azimuth step, plus a few returns above the
//! field of view, and is delivered through the raw payload codec like a
//! driver would.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{Frame, FrameCallback, FrameSource, PointSample, RawPointCloud, SourceConfig};
use scan_mapper::ScanMapper;
use tracing::{debug, trace, warn};

use crate::codec;
use crate::config::IngestionMetrics;

/// Elevation offset of the out-of-FOV returns above the top ring (degrees)
const OUT_OF_FOV_MARGIN_DEG: f64 = 10.0;

/// Mock frame source configuration
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Source ID
    pub source_id: String,

    /// Revolutions per second
    pub frequency_hz: f64,

    /// Returns per ring per revolution
    pub azimuth_steps: u32,

    /// Range of every return (metres)
    pub range_m: f64,

    /// Returns above the field of view per revolution
    pub out_of_fov_points: u32,

    /// Stop after this many frames (None = until stopped)
    pub max_frames: Option<u64>,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self::from(&SourceConfig::default())
    }
}

impl From<&SourceConfig> for MockSourceConfig {
    fn from(config: &SourceConfig) -> Self {
        Self {
            source_id: "mock_lidar".to_string(),
            frequency_hz: config.frequency_hz,
            azimuth_steps: config.azimuth_steps,
            range_m: config.range_m,
            out_of_fov_points: config.out_of_fov_points,
            max_frames: None,
        }
    }
}

/// Mock frame source
pub struct MockFrameSource {
    config: MockSourceConfig,
    ring_angles: Arc<Vec<f64>>,
    out_of_fov_angle: f64,
    listening: Arc<AtomicBool>,
    frames_sent: Arc<AtomicU64>,
    metrics: Arc<IngestionMetrics>,
}

impl MockFrameSource {
    /// Create a source emitting one return per ring of `mapper`
    pub fn new(config: MockSourceConfig, mapper: &ScanMapper) -> Self {
        let ring_angles: Vec<f64> = (0..mapper.ring_count())
            .filter_map(|ring| mapper.ring_angle(ring))
            .collect();
        let (_, top) = mapper.vertical_fov();

        Self {
            config,
            ring_angles: Arc::new(ring_angles),
            out_of_fov_angle: top + OUT_OF_FOV_MARGIN_DEG,
            listening: Arc::new(AtomicBool::new(false)),
            frames_sent: Arc::new(AtomicU64::new(0)),
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Count rejected payloads in the pipeline's metrics
    pub fn with_metrics(mut self, metrics: Arc<IngestionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Stop after `max_frames` frames
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.config.max_frames = Some(max_frames);
        self
    }

    /// Points per generated frame
    pub fn points_per_frame(&self) -> usize {
        self.ring_angles.len() * self.config.azimuth_steps as usize
            + self.config.out_of_fov_points as usize
    }

    /// Frames delivered so far
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    /// Raw payload of revolution `index`
    pub fn generate_payload(&self, index: u64) -> RawPointCloud {
        let points = revolution(
            &self.ring_angles,
            self.out_of_fov_angle,
            &self.config,
            index,
        );
        codec::encode_point_cloud(&points, 1.0)
    }

    /// Decoded frame of revolution `index`
    pub fn generate_frame(&self, index: u64) -> Frame {
        let points = revolution(
            &self.ring_angles,
            self.out_of_fov_angle,
            &self.config,
            index,
        );
        Frame::new(index as f64 / self.config.frequency_hz, points).with_frame_id(index)
    }
}

/// Build one revolution, firing all rings per azimuth step
fn revolution(
    ring_angles: &[f64],
    out_of_fov_angle: f64,
    config: &MockSourceConfig,
    index: u64,
) -> Vec<PointSample> {
    let steps = config.azimuth_steps.max(1);
    let mut points =
        Vec::with_capacity(ring_angles.len() * steps as usize + config.out_of_fov_points as usize);
    // Rotate the start azimuth a little per frame
    let phase = (index % 360) as f64;

    for step in 0..steps {
        let azimuth = phase + 360.0 * f64::from(step) / f64::from(steps);
        for &elevation in ring_angles {
            points.push(spherical(config.range_m, elevation, azimuth));
        }
    }
    for i in 0..config.out_of_fov_points {
        let azimuth = 360.0 * f64::from(i) / f64::from(config.out_of_fov_points);
        points.push(spherical(config.range_m, out_of_fov_angle, azimuth));
    }
    points
}

fn spherical(range: f64, elevation_deg: f64, azimuth_deg: f64) -> PointSample {
    let (el, az) = (elevation_deg.to_radians(), azimuth_deg.to_radians());
    PointSample::new(
        (range * el.cos() * az.cos()) as f32,
        (range * el.cos() * az.sin()) as f32,
        (range * el.sin()) as f32,
    )
}

impl FrameSource for MockFrameSource {
    fn source_id(&self) -> &str {
        &self.config.source_id
    }

    fn listen(&self, callback: FrameCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            warn!(source_id = %self.config.source_id, "mock source already listening");
            return;
        }

        let interval = match Duration::try_from_secs_f64(1.0 / self.config.frequency_hz) {
            Ok(interval) => interval,
            Err(e) => {
                warn!(
                    source_id = %self.config.source_id,
                    frequency_hz = self.config.frequency_hz,
                    error = %e,
                    "mock source frequency gives no usable period, not starting"
                );
                self.listening.store(false, Ordering::SeqCst);
                return;
            }
        };

        let config = self.config.clone();
        let ring_angles = self.ring_angles.clone();
        let out_of_fov_angle = self.out_of_fov_angle;
        let listening = self.listening.clone();
        let frames_sent = self.frames_sent.clone();
        let metrics = self.metrics.clone();

        std::thread::spawn(move || {
            debug!(
                source_id = %config.source_id,
                frequency_hz = config.frequency_hz,
                rings = ring_angles.len(),
                "mock frame source started"
            );

            let mut index: u64 = 0;
            while listening.load(Ordering::Relaxed) {
                if config.max_frames.is_some_and(|max| index >= max) {
                    break;
                }

                let points = revolution(&ring_angles, out_of_fov_angle, &config, index);
                let raw = codec::encode_point_cloud(&points, 1.0);
                let timestamp = index as f64 / config.frequency_hz;

                if let Some(frame) = codec::admit_payload(&metrics, timestamp, Some(index), &raw) {
                    callback(frame);
                    frames_sent.fetch_add(1, Ordering::Relaxed);
                    trace!(source_id = %config.source_id, frame_id = index, timestamp, "mock frame sent");
                }

                index += 1;
                std::thread::sleep(interval);
            }

            listening.store(false, Ordering::SeqCst);
            debug!(source_id = %config.source_id, frames = index, "mock frame source stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::IngestionController;
    use contracts::CalibrationProfile;
    use std::sync::Mutex;

    fn mapper(name: &str) -> ScanMapper {
        ScanMapper::configure(CalibrationProfile::preset(name).unwrap()).unwrap()
    }

    fn small_config() -> MockSourceConfig {
        MockSourceConfig {
            frequency_hz: 200.0,
            azimuth_steps: 12,
            out_of_fov_points: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_generated_frame_fills_every_ring() {
        let mapper = mapper("VLP-16");
        let source = MockFrameSource::new(small_config(), &mapper);
        let frame = source.generate_frame(4);

        assert_eq!(frame.len(), source.points_per_frame());
        assert_eq!(frame.frame_id, Some(4));

        let mut controller = IngestionController::new(Arc::new(mapper), 0);
        let scan = controller.on_frame(frame).into_scan().unwrap();
        assert!(scan.rings.iter().all(|r| r.len() == 12));
        assert_eq!(scan.stats.out_of_fov, 3);
    }

    #[test]
    fn test_payload_decodes_to_frame_points() {
        let mapper = mapper("HDL-32");
        let source = MockFrameSource::new(small_config(), &mapper);
        let raw = source.generate_payload(1);
        let decoded = codec::decode_points(&raw, Some(1)).unwrap();
        assert_eq!(decoded, source.generate_frame(1).points);
    }

    #[test]
    fn test_listen_delivers_max_frames() {
        let mapper = mapper("VLP-16");
        let source = MockFrameSource::new(small_config(), &mapper).with_max_frames(3);

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        source.listen(Arc::new(move |frame: Frame| {
            sink.lock().unwrap().push(frame.frame_id);
        }));

        for _ in 0..200 {
            if !source.is_listening() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(!source.is_listening());
        assert_eq!(source.frames_sent(), 3);
        assert_eq!(*received.lock().unwrap(), vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_unusable_frequency_does_not_start() {
        let mapper = mapper("VLP-16");
        let config = MockSourceConfig {
            frequency_hz: 1e-300,
            ..small_config()
        };
        let source = MockFrameSource::new(config, &mapper);

        source.listen(Arc::new(|_frame: Frame| {}));

        assert!(!source.is_listening());
        assert_eq!(source.frames_sent(), 0);
    }

    #[test]
    fn test_shared_metrics_stay_clean_for_valid_payloads() {
        let mapper = mapper("VLP-16");
        let metrics = Arc::new(IngestionMetrics::new());
        let source = MockFrameSource::new(small_config(), &mapper)
            .with_max_frames(2)
            .with_metrics(Arc::clone(&metrics));

        source.listen(Arc::new(|_frame: Frame| {}));
        for _ in 0..200 {
            if !source.is_listening() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(source.frames_sent(), 2);
        assert_eq!(metrics.snapshot().decode_errors, 0);
    }
}
