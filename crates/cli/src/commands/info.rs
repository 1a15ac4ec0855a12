//! `info` command implementation.

use anyhow::{Context, Result};
use scan_mapper::ScanMapper;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    calibration: CalibrationInfo,
    ingestion: IngestionInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct CalibrationInfo {
    profile: contracts::CalibrationProfile,
    defaulted: bool,
    ring_count: usize,
    fov_min_deg: f64,
    fov_max_deg: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ring_angles_deg: Vec<f64>,
}

#[derive(Serialize)]
struct IngestionInfo {
    warmup_frames: u32,
    queue_depth: usize,
    drop_policy: contracts::DropPolicy,
    min_point_range: f64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: contracts::SinkType,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint, args)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(
    blueprint: &contracts::PipelineBlueprint,
    args: &InfoArgs,
) -> Result<ConfigInfo, CliError> {
    let resolved = blueprint.calibration.resolve()?;
    let mapper = ScanMapper::configure(resolved.profile)?;
    let (fov_min_deg, fov_max_deg) = mapper.vertical_fov();

    let ring_angles_deg = if args.rings {
        (0..mapper.ring_count())
            .filter_map(|ring| mapper.ring_angle(ring))
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: s.sink_type,
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(ConfigInfo {
        version: format!("{:?}", blueprint.version),
        calibration: CalibrationInfo {
            profile: resolved.profile,
            defaulted: resolved.defaulted,
            ring_count: mapper.ring_count(),
            fov_min_deg,
            fov_max_deg,
            ring_angles_deg,
        },
        ingestion: IngestionInfo {
            warmup_frames: blueprint.ingestion.warmup_frames,
            queue_depth: blueprint.ingestion.queue_depth,
            drop_policy: blueprint.ingestion.drop_policy,
            min_point_range: blueprint.ingestion.min_point_range,
        },
        sinks,
    })
}

fn print_config_info(info: &ConfigInfo) {
    println!("=== ringscan Configuration ===\n");

    let calibration = &info.calibration;
    println!("Calibration");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Profile: {}", calibration.profile);
    if calibration.defaulted {
        println!("   ├─ Source: default model (nothing configured)");
    }
    println!("   ├─ Rings: {}", calibration.ring_count);
    println!(
        "   └─ Vertical FOV: {:.3}° .. {:.3}°",
        calibration.fov_min_deg, calibration.fov_max_deg
    );

    if !calibration.ring_angles_deg.is_empty() {
        println!("\nRing elevations");
        let last = calibration.ring_angles_deg.len() - 1;
        for (ring, angle) in calibration.ring_angles_deg.iter().enumerate() {
            let prefix = if ring == last { "└─" } else { "├─" };
            println!("   {} ring {:>4}: {:>8.3}°", prefix, ring, angle);
        }
    }

    let ingestion = &info.ingestion;
    println!("\nIngestion");
    println!("   ├─ Warm-up frames: {}", ingestion.warmup_frames);
    println!(
        "   ├─ Frame queue: depth {} ({:?})",
        ingestion.queue_depth, ingestion.drop_policy
    );
    println!("   └─ Min point range: {} m", ingestion.min_point_range);

    if !info.sinks.is_empty() {
        println!("\nSinks ({})", info.sinks.len());
        for (i, sink) in info.sinks.iter().enumerate() {
            let prefix = if i == info.sinks.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {} ({:?}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CalibrationConfig, PipelineBlueprint};
    use std::path::PathBuf;

    fn args(rings: bool) -> InfoArgs {
        InfoArgs {
            config: PathBuf::from("unused.toml"),
            json: true,
            rings,
            sinks: false,
        }
    }

    fn blueprint(calibration: CalibrationConfig) -> PipelineBlueprint {
        PipelineBlueprint {
            version: Default::default(),
            calibration,
            ingestion: Default::default(),
            source: Default::default(),
            sinks: Vec::new(),
        }
    }

    #[test]
    fn test_ring_table_for_linear_profile() {
        let bp = blueprint(CalibrationConfig::explicit(-15.0, 15.0, 16));
        let info = build_config_info(&bp, &args(true)).unwrap();

        assert_eq!(info.calibration.ring_count, 16);
        assert_eq!(info.calibration.ring_angles_deg.len(), 16);
        assert!((info.calibration.ring_angles_deg[0] + 15.0).abs() < 1e-9);
        assert!((info.calibration.ring_angles_deg[15] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_preset_fov() {
        let bp = blueprint(CalibrationConfig::preset("HDL-64E"));
        let info = build_config_info(&bp, &args(false)).unwrap();

        assert_eq!(info.calibration.ring_count, 64);
        assert!(info.calibration.ring_angles_deg.is_empty());
        assert!(info.calibration.fov_min_deg < -24.0);
        assert!(info.calibration.fov_max_deg > 1.9);
    }

    #[test]
    fn test_unknown_model_rejected() {
        let bp = blueprint(CalibrationConfig::preset("VLP-32"));
        assert!(matches!(
            build_config_info(&bp, &args(false)),
            Err(CliError::Calibration(_))
        ));
    }
}
