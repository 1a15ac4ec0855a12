//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract snapshot tests
//! - Config -> mapper -> controller -> dispatcher flows (no hardware)
//! - Backpressure behaviour of the frame queue

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_blueprint_toml_roundtrip_keeps_calibration() {
        let toml = r#"
[calibration]
min_vertical_angle = -24.8
max_vertical_angle = 2.0
n_scan_rings = 64

[[sinks]]
name = "registration"
sink_type = "channel"
"#;
        let blueprint = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let rendered = ConfigLoader::to_toml(&blueprint).unwrap();
        let reparsed = ConfigLoader::load_from_str(&rendered, ConfigFormat::Toml).unwrap();

        assert_eq!(
            reparsed.calibration.resolve().unwrap().profile,
            blueprint.calibration.resolve().unwrap().profile
        );
        assert_eq!(reparsed.sinks.len(), 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Frame, PointSample, RingScan, SinkConfig, SinkType};
    use dispatcher::create_dispatcher;
    use ingestion::{
        BackpressureConfig, DropPolicy, FrameQueue, IngestionController, IngestionMetrics,
        IngestionPipeline, IngestionWorker, MockFrameSource, MockSourceConfig, PushOutcome,
    };
    use scan_mapper::ScanMapper;
    use tokio::sync::mpsc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn point_at(elevation_deg: f64) -> PointSample {
        let el = elevation_deg.to_radians();
        PointSample::new((10.0 * el.cos()) as f32, 0.0, (10.0 * el.sin()) as f32)
    }

    fn frame(index: u64, elevations: &[f64]) -> Frame {
        Frame::new(index as f64 * 0.1, elevations.iter().map(|&e| point_at(e)).collect())
            .with_frame_id(index)
    }

    /// Config -> ScanMapper -> controller -> worker -> dispatcher -> channel sink
    ///
    /// Uses the 16-ring linear calibration over [-15°, 15°]: elevations
    /// -15, -13, 0 and 15 land on rings 0, 1, 8 and 15.
    #[tokio::test]
    async fn test_e2e_linear_calibration_to_channel_sink() {
        let toml = r#"
[calibration]
min_vertical_angle = -15.0
max_vertical_angle = 15.0
n_scan_rings = 16

[ingestion]
warmup_frames = 1
queue_depth = 4

[[sinks]]
name = "registration"
sink_type = "channel"
"#;
        let blueprint = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let mapper = Arc::new(ScanMapper::from_config(&blueprint.calibration).unwrap());
        assert_eq!(mapper.ring_count(), 16);

        let metrics = Arc::new(IngestionMetrics::new());
        let (queue, frames) =
            FrameQueue::bounded(&BackpressureConfig::from(&blueprint.ingestion), metrics.clone());
        let controller = IngestionController::from_config(mapper, &blueprint.ingestion);

        let (scan_tx, mut scan_rx) = mpsc::channel::<RingScan>(4);
        let worker = IngestionWorker::spawn(controller, frames, scan_tx, metrics.clone());

        let (dispatch_tx, dispatch_rx) = mpsc::channel::<RingScan>(4);
        let mut dispatcher = create_dispatcher(blueprint.sinks.clone(), dispatch_rx)
            .await
            .unwrap();
        let mut registration = dispatcher.take_channel("registration").unwrap();
        let dispatcher_handle = dispatcher.spawn();

        // Warm-up frame, then the reference frame
        assert_eq!(queue.push(frame(0, &[0.0])), PushOutcome::Queued);
        assert_eq!(
            queue.push(frame(1, &[-15.0, -13.0, 0.0, 15.0, 40.0])),
            PushOutcome::Queued
        );
        queue.close();

        let scan = tokio::time::timeout(TIMEOUT, scan_rx.recv())
            .await
            .unwrap()
            .unwrap();
        dispatch_tx.send(scan).await.unwrap();
        drop(dispatch_tx);

        let received = tokio::time::timeout(TIMEOUT, registration.recv())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(received.scan_id, 0);
        assert_eq!(received.frame_id, Some(1));
        assert_eq!(received.ring_count(), 16);
        let occupied: Vec<usize> = received
            .rings
            .iter()
            .filter(|g| !g.is_empty())
            .map(|g| g.ring)
            .collect();
        assert_eq!(occupied, vec![0, 1, 8, 15]);
        assert_eq!(received.empty_rings(), 12);
        assert_eq!(received.stats.out_of_fov, 1);
        assert_eq!(received.stats.points_assigned, 4);

        let report = worker.await.unwrap();
        assert_eq!(report.frames_skipped, 1);
        assert_eq!(report.scans_dispatched, 1);
        tokio::time::timeout(TIMEOUT, dispatcher_handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(metrics.snapshot().frames_skipped, 1);
    }

    /// Frames queued while the consumer is busy: only the newest survive
    #[tokio::test]
    async fn test_drop_oldest_keeps_newest_frames() {
        let mapper = Arc::new(
            ScanMapper::from_config(&contracts::CalibrationConfig::preset("VLP-16")).unwrap(),
        );
        let metrics = Arc::new(IngestionMetrics::new());
        let (queue, frames) = FrameQueue::bounded(
            &BackpressureConfig::new(2, DropPolicy::DropOldest),
            metrics.clone(),
        );

        for index in 0..6 {
            queue.push(frame(index, &[1.0]));
        }
        queue.close();

        let controller = IngestionController::new(mapper, 0);
        let (scan_tx, mut scan_rx) = mpsc::channel::<RingScan>(8);
        let worker = IngestionWorker::spawn(controller, frames, scan_tx, metrics.clone());

        let mut frame_ids = Vec::new();
        while let Some(scan) = tokio::time::timeout(TIMEOUT, scan_rx.recv()).await.unwrap() {
            frame_ids.push(scan.frame_id.unwrap());
        }
        worker.await.unwrap();

        assert_eq!(frame_ids, vec![4, 5]);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_received, 6);
        assert_eq!(snapshot.frames_dropped, 4);
        assert_eq!(snapshot.scans_dispatched, 2);
    }

    /// Preset mapper over the synthetic source: every ring is populated and
    /// out-of-FOV returns are counted, never clamped
    #[tokio::test]
    async fn test_mock_source_hdl64e_fills_every_ring() {
        let mapper = Arc::new(
            ScanMapper::from_config(&contracts::CalibrationConfig::preset("HDL-64E")).unwrap(),
        );
        let source_config = MockSourceConfig {
            frequency_hz: 200.0,
            azimuth_steps: 4,
            out_of_fov_points: 3,
            max_frames: Some(3),
            ..Default::default()
        };
        let mut pipeline =
            IngestionPipeline::new(BackpressureConfig::new(8, DropPolicy::DropOldest));
        let source = MockFrameSource::new(source_config, &mapper).with_metrics(pipeline.metrics());
        pipeline.register_source(Box::new(source)).unwrap();
        let frames = pipeline.take_receiver().unwrap();

        let controller = IngestionController::new(Arc::clone(&mapper), 1);
        let (scan_tx, mut scan_rx) = mpsc::channel::<RingScan>(8);
        let worker = IngestionWorker::spawn(controller, frames, scan_tx, pipeline.metrics());

        pipeline.start_all();

        let mut scans = Vec::new();
        for _ in 0..2 {
            let scan = tokio::time::timeout(TIMEOUT, scan_rx.recv())
                .await
                .unwrap()
                .unwrap();
            scans.push(scan);
        }
        pipeline.shutdown();
        drop(scan_rx);
        worker.await.unwrap();

        for scan in &scans {
            assert_eq!(scan.ring_count(), 64);
            assert_eq!(scan.empty_rings(), 0);
            assert!(scan.rings.iter().all(|g| g.len() == 4));
            assert_eq!(scan.stats.out_of_fov, 3);
        }
        assert_eq!(scans[0].frame_id, Some(1));
        assert_eq!(pipeline.metrics().snapshot().decode_errors, 0);
    }

    /// Synthetic source through a file sink
    #[tokio::test]
    async fn test_file_sink_receives_scans() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert(
            "base_path".to_string(),
            dir.path().to_string_lossy().into_owned(),
        );
        let sinks = vec![SinkConfig {
            name: "disk".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 8,
            params,
        }];

        let mapper = Arc::new(
            ScanMapper::from_config(&contracts::CalibrationConfig::explicit(-30.0, 10.0, 32))
                .unwrap(),
        );
        let metrics = Arc::new(IngestionMetrics::new());
        let (queue, frames) = FrameQueue::bounded(&BackpressureConfig::default(), metrics.clone());
        let controller = IngestionController::new(mapper, 2);

        let (scan_tx, scan_rx) = mpsc::channel::<RingScan>(4);
        let worker = IngestionWorker::spawn(controller, frames, scan_tx, metrics);

        let dispatcher = create_dispatcher(sinks, scan_rx).await.unwrap();
        let sink_metrics = dispatcher.sink_metrics();
        let dispatcher_handle = dispatcher.spawn();

        for index in 0..4 {
            queue.push(frame(index, &[-30.0, -10.0, 10.0]));
            // Let the worker drain so nothing is evicted
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        queue.close();

        let report = tokio::time::timeout(TIMEOUT, worker).await.unwrap().unwrap();
        assert_eq!(report.scans_dispatched, 2);
        tokio::time::timeout(TIMEOUT, dispatcher_handle)
            .await
            .unwrap()
            .unwrap();

        let (_, disk) = &sink_metrics[0];
        assert_eq!(disk.write_count(), 2);
        for scan_id in 0..2 {
            assert!(dir.path().join(format!("meta/{scan_id}.json")).exists());
            assert!(dir.path().join(format!("scans/{scan_id}.ply")).exists());
        }

        let meta = std::fs::read_to_string(dir.path().join("meta/0.json")).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&meta).unwrap();
        assert_eq!(summary["frame_id"], 2);
        assert_eq!(summary["ring_counts"].as_array().unwrap().len(), 32);
    }

    /// Scan metrics aggregate across a run
    #[tokio::test]
    async fn test_aggregator_tracks_dispatched_scans() {
        let mapper = Arc::new(
            ScanMapper::from_config(&contracts::CalibrationConfig::preset("HDL-32")).unwrap(),
        );
        let mut controller = IngestionController::new(mapper, 0);
        let mut aggregator = observability::ScanMetricsAggregator::new();

        for index in 0..3 {
            let scan = controller
                .on_frame(frame(index, &[-30.67, 10.67, 60.0]))
                .into_scan()
                .unwrap();
            observability::record_scan_metrics(&scan);
            aggregator.update(&scan);
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_scans, 3);
        assert_eq!(summary.total_points, 6);
        assert_eq!(summary.total_out_of_fov, 3);
        assert_eq!(summary.ring_totals[0], 3);
        assert_eq!(summary.ring_totals[31], 3);
        assert!((summary.scan_interval_ms.mean - 100.0).abs() < 1e-6);
    }
}
