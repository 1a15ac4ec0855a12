//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(warmup) = args.warmup_frames {
        info!(warmup_frames = warmup, "Overriding warm-up frames from CLI");
        blueprint.ingestion.warmup_frames = warmup;
    }

    info!(
        warmup_frames = blueprint.ingestion.warmup_frames,
        queue_depth = blueprint.ingestion.queue_depth,
        drop_policy = ?blueprint.ingestion.drop_policy,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        max_scans: (args.max_scans > 0).then_some(args.max_scans),
        max_frames: (args.max_frames > 0).then_some(args.max_frames),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    info!("Starting pipeline...");
    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        scans = stats.scans_dispatched,
        frames_dropped = stats.ingestion.frames_dropped,
        duration_secs = stats.duration.as_secs_f64(),
        scan_rate = format!("{:.2}", stats.scan_rate()),
        "Pipeline completed"
    );
    stats.print_summary();

    info!("ringscan finished");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::PipelineBlueprint) {
    println!("\n=== Configuration Summary ===\n");

    println!("Calibration:");
    match blueprint.calibration.resolve() {
        Ok(resolved) => {
            println!("  Profile: {}", resolved.profile);
            if resolved.defaulted {
                println!("  (default model, nothing configured)");
            }
        }
        Err(e) => println!("  Error: {}", e),
    }

    let ingestion = &blueprint.ingestion;
    println!("\nIngestion:");
    println!("  Warm-up frames: {}", ingestion.warmup_frames);
    println!(
        "  Frame queue: depth {} ({:?})",
        ingestion.queue_depth, ingestion.drop_policy
    );
    println!("  Min point range: {} m", ingestion.min_point_range);

    let source = &blueprint.source;
    println!("\nSource:");
    println!(
        "  Synthetic at {} Hz, {} azimuth steps, {} m",
        source.frequency_hz, source.azimuth_steps, source.range_m
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
