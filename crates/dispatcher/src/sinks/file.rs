//! FileSink - writes scans to disk with folder structure
//!
//! Layout under `base_path`:
//! - `meta/<scan_id>.json`: `ScanSummary`
//! - `scans/<scan_id>.ply`: binary little-endian PLY, `x y z` floats and a
//!   `ring` ushort, written ring by ring

use contracts::{ContractError, RingScan, ScanSink};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

use super::ScanSummary;

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,

    /// Also write the point cloud, not only the summary
    pub write_points: bool,
}

impl FileSinkConfig {
    /// Create config from params map
    ///
    /// Recognized keys: `base_path` (default `./output`), `write_points`
    /// (default `true`).
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));
        let write_points = params
            .get("write_points")
            .map(|v| v != "false")
            .unwrap_or(true);

        Self {
            base_path,
            write_points,
        }
    }
}

/// Sink that writes scans to disk files
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    meta_dir: PathBuf,
    scan_dir: PathBuf,
}

impl FileSink {
    /// Create a new FileSink, creating its directories
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        let meta_dir = config.base_path.join("meta");
        let scan_dir = config.base_path.join("scans");
        fs::create_dir_all(&meta_dir)?;
        if config.write_points {
            fs::create_dir_all(&scan_dir)?;
        }

        Ok(Self {
            name: name.into(),
            config,
            meta_dir,
            scan_dir,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    fn write_scan_to_disk(&self, scan: &RingScan) -> std::io::Result<()> {
        let meta_path = self.meta_dir.join(format!("{}.json", scan.scan_id));
        let meta_file = BufWriter::new(File::create(meta_path)?);
        serde_json::to_writer(meta_file, &ScanSummary::from(scan))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if self.config.write_points {
            let ply_path = self.scan_dir.join(format!("{}.ply", scan.scan_id));
            save_ply(&ply_path, scan)?;
        }

        Ok(())
    }

    fn persist_scan(&self, scan: &RingScan) -> Result<(), ContractError> {
        self.write_scan_to_disk(scan).map_err(|e| {
            error!(sink = %self.name, scan_id = scan.scan_id, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

fn save_ply(path: &Path, scan: &RingScan) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "ply")?;
    writeln!(file, "format binary_little_endian 1.0")?;
    writeln!(file, "comment timestamp {}", scan.timestamp)?;
    writeln!(file, "element vertex {}", scan.point_count())?;
    writeln!(file, "property float x")?;
    writeln!(file, "property float y")?;
    writeln!(file, "property float z")?;
    writeln!(file, "property ushort ring")?;
    writeln!(file, "end_header")?;

    for group in &scan.rings {
        let ring = (group.ring as u16).to_le_bytes();
        for p in &group.points {
            file.write_all(&p.x.to_le_bytes())?;
            file.write_all(&p.y.to_le_bytes())?;
            file.write_all(&p.z.to_le_bytes())?;
            file.write_all(&ring)?;
        }
    }
    file.flush()
}

impl ScanSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, scan),
        fields(sink = %self.name, scan_id = scan.scan_id)
    )]
    async fn write(&mut self, scan: &RingScan) -> Result<(), ContractError> {
        self.persist_scan(scan)
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}
