//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    calibration: String,
    ring_count: usize,
    warmup_frames: u32,
    queue_depth: usize,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Loading runs the full validator, including mapper construction
    let blueprint = match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => blueprint,
        Err(e) => {
            return ValidationResult {
                valid: false,
                config_path,
                error: Some(e.to_string()),
                warnings: None,
                summary: None,
            }
        }
    };

    let resolved = match blueprint.calibration.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            return ValidationResult {
                valid: false,
                config_path,
                error: Some(e.to_string()),
                warnings: None,
                summary: None,
            }
        }
    };

    let warnings = collect_warnings(&blueprint, resolved.defaulted);
    let ring_count = match resolved.profile {
        contracts::CalibrationProfile::VendorPreset { model } => model.ring_count(),
        contracts::CalibrationProfile::Explicit { ring_count, .. } => ring_count as usize,
    };

    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: (!warnings.is_empty()).then_some(warnings),
        summary: Some(ConfigSummary {
            version: format!("{:?}", blueprint.version),
            calibration: resolved.profile.to_string(),
            ring_count,
            warmup_frames: blueprint.ingestion.warmup_frames,
            queue_depth: blueprint.ingestion.queue_depth,
            sink_count: blueprint.sinks.len(),
        }),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::PipelineBlueprint, defaulted: bool) -> Vec<String> {
    let mut warnings = Vec::new();

    if defaulted {
        warnings.push(format!(
            "No calibration configured - falling back to {}",
            contracts::DEFAULT_VENDOR_MODEL
        ));
    }

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - ring scans will be discarded".to_string());
    }

    if blueprint.ingestion.warmup_frames == 0 {
        warnings.push(
            "ingestion.warmup_frames is 0 - the first revolutions may be partial".to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Calibration: {}", summary.calibration);
            println!("  Rings: {}", summary.ring_count);
            println!("  Warm-up frames: {}", summary.warmup_frames);
            println!("  Frame queue depth: {}", summary.queue_depth);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
