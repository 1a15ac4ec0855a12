//! Configuration validation
//!
//! Rules:
//! - exactly one calibration form, with a valid range and ring count
//! - queue_depth >= 1, output_capacity >= 1
//! - min_point_range finite and >= 0
//! - source.frequency_hz > 0 with a representable period, source.azimuth_steps >= 1
//! - source.range_m > ingestion.min_point_range
//! - sink names non-empty and unique, sink queue_capacity >= 1

use std::collections::HashSet;
use std::time::Duration;

use contracts::{ContractError, PipelineBlueprint};
use scan_mapper::ScanMapper;

/// Validate a PipelineBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_calibration(blueprint)?;
    validate_ingestion(blueprint)?;
    validate_source(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// Calibration must resolve to a mapper
fn validate_calibration(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let resolved = blueprint.calibration.resolve()?;
    ScanMapper::configure(resolved.profile)?;
    Ok(())
}

/// Queue bounds and point filtering
fn validate_ingestion(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let ingestion = &blueprint.ingestion;

    if ingestion.queue_depth == 0 {
        return Err(ContractError::config_validation(
            "ingestion.queue_depth",
            "queue_depth must be >= 1",
        ));
    }

    if ingestion.output_capacity == 0 {
        return Err(ContractError::config_validation(
            "ingestion.output_capacity",
            "output_capacity must be >= 1",
        ));
    }

    if !ingestion.min_point_range.is_finite() || ingestion.min_point_range < 0.0 {
        return Err(ContractError::config_validation(
            "ingestion.min_point_range",
            format!(
                "min_point_range must be finite and >= 0, got {}",
                ingestion.min_point_range
            ),
        ));
    }

    Ok(())
}

/// Synthetic source parameters
fn validate_source(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.source;

    let has_period = Duration::try_from_secs_f64(1.0 / source.frequency_hz).is_ok();
    if source.frequency_hz.is_nan() || source.frequency_hz <= 0.0 || !has_period {
        return Err(ContractError::config_validation(
            "source.frequency_hz",
            format!(
                "frequency_hz must be > 0 with a representable period, got {}",
                source.frequency_hz
            ),
        ));
    }

    if source.azimuth_steps == 0 {
        return Err(ContractError::config_validation(
            "source.azimuth_steps",
            "azimuth_steps must be >= 1",
        ));
    }

    if source.range_m.is_nan() || source.range_m <= blueprint.ingestion.min_point_range {
        return Err(ContractError::config_validation(
            "source.range_m",
            format!(
                "range_m ({}) must be > ingestion.min_point_range ({})",
                source.range_m, blueprint.ingestion.min_point_range
            ),
        ));
    }

    Ok(())
}

/// Sink configuration
fn validate_sinks(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be >= 1",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        CalibrationConfig, ConfigError, ConfigVersion, IngestionConfig, SinkConfig, SinkType,
        SourceConfig,
    };

    fn minimal_blueprint() -> PipelineBlueprint {
        PipelineBlueprint {
            version: ConfigVersion::V1,
            calibration: CalibrationConfig::preset("VLP-16"),
            ingestion: IngestionConfig::default(),
            source: SourceConfig::default(),
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 8,
                params: Default::default(),
            }],
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_unknown_model() {
        let mut bp = minimal_blueprint();
        bp.calibration = CalibrationConfig::preset("bad-model");
        let err = validate(&bp).unwrap_err();
        assert!(
            matches!(
                err,
                ContractError::Calibration(ConfigError::UnknownModel { .. })
            ),
            "got: {err}"
        );
    }

    #[test]
    fn test_inverted_range() {
        let mut bp = minimal_blueprint();
        bp.calibration = CalibrationConfig::explicit(10.0, 5.0, 16);
        let err = validate(&bp).unwrap_err();
        assert!(
            matches!(
                err,
                ContractError::Calibration(ConfigError::InvalidRange { .. })
            ),
            "got: {err}"
        );
    }

    #[test]
    fn test_too_few_rings() {
        let mut bp = minimal_blueprint();
        bp.calibration = CalibrationConfig::explicit(-15.0, 15.0, 1);
        let err = validate(&bp).unwrap_err();
        assert!(
            matches!(
                err,
                ContractError::Calibration(ConfigError::InvalidRingCount { count: 1 })
            ),
            "got: {err}"
        );
    }

    #[test]
    fn test_missing_calibration() {
        let mut bp = minimal_blueprint();
        bp.calibration = CalibrationConfig::default();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("no calibration configured"), "got: {err}");
    }

    #[test]
    fn test_zero_queue_depth() {
        let mut bp = minimal_blueprint();
        bp.ingestion.queue_depth = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("queue_depth must be >= 1"), "got: {err}");
    }

    #[test]
    fn test_negative_min_point_range() {
        let mut bp = minimal_blueprint();
        bp.ingestion.min_point_range = -1.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("min_point_range"), "got: {err}");
    }

    #[test]
    fn test_invalid_frequency() {
        let mut bp = minimal_blueprint();
        bp.source.frequency_hz = -5.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("frequency_hz must be > 0"), "got: {err}");

        bp.source.frequency_hz = 1e-300;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("representable period"), "got: {err}");
    }

    #[test]
    fn test_source_range_below_filter() {
        let mut bp = minimal_blueprint();
        bp.source.range_m = 0.001;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("range_m"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(bp.sinks[0].clone());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_zero_sink_queue() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].queue_capacity = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("queue_capacity"), "got: {err}");
    }
}
