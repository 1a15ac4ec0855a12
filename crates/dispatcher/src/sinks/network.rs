//! UDP sink: one datagram per ring scan, best effort.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

use contracts::{ContractError, RingScan, ScanSink};
use serde::Serialize;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, warn};

use super::ScanSummary;

/// Largest UDP payload over IPv4 is 65507; leave headroom
const DEFAULT_MAX_DATAGRAM: usize = 65000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkParamError {
    #[error("missing 'addr' parameter")]
    MissingAddr,
    #[error("invalid address '{0}'")]
    InvalidAddr(String),
    #[error("unknown {key} '{value}'")]
    UnknownValue { key: &'static str, value: String },
    #[error("invalid max_packet_size '{0}'")]
    InvalidMaxPacketSize(String),
}

/// Wire encoding of each datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    #[default]
    Json,
    Bincode,
}

impl FromStr for NetworkFormat {
    type Err = NetworkParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "bincode" => Ok(Self::Bincode),
            other => Err(NetworkParamError::UnknownValue {
                key: "format",
                value: other.to_string(),
            }),
        }
    }
}

/// What each datagram carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkContent {
    /// `ScanSummary` only
    #[default]
    Summary,
    /// Complete `RingScan` including points
    Full,
}

impl FromStr for NetworkContent {
    type Err = NetworkParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(Self::Summary),
            "full" => Ok(Self::Full),
            other => Err(NetworkParamError::UnknownValue {
                key: "content",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    pub addr: SocketAddr,
    pub format: NetworkFormat,
    pub content: NetworkContent,
    /// Larger datagrams are skipped, not fragmented
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            format: NetworkFormat::default(),
            content: NetworkContent::default(),
            max_packet_size: DEFAULT_MAX_DATAGRAM,
        }
    }

    /// Read `addr`, `format`, `content` and `max_packet_size` from sink params
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, NetworkParamError> {
        let raw_addr = params.get("addr").ok_or(NetworkParamError::MissingAddr)?;
        let addr = raw_addr
            .parse()
            .map_err(|_| NetworkParamError::InvalidAddr(raw_addr.clone()))?;

        let mut config = Self::new(addr);
        if let Some(format) = params.get("format") {
            config.format = format.parse()?;
        }
        if let Some(content) = params.get("content") {
            config.content = content.parse()?;
        }
        if let Some(size) = params.get("max_packet_size") {
            config.max_packet_size = size
                .parse()
                .map_err(|_| NetworkParamError::InvalidMaxPacketSize(size.clone()))?;
        }
        Ok(config)
    }

    fn encode(&self, scan: &RingScan) -> Result<Vec<u8>, String> {
        match self.content {
            NetworkContent::Summary => self.encode_value(&ScanSummary::from(scan)),
            NetworkContent::Full => self.encode_value(scan),
        }
    }

    fn encode_value<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, String> {
        match self.format {
            NetworkFormat::Json => serde_json::to_vec(value).map_err(|e| e.to_string()),
            NetworkFormat::Bincode => bincode::serialize(value).map_err(|e| e.to_string()),
        }
    }
}

pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
    oversize_count: u64,
}

impl NetworkSink {
    /// Bind an ephemeral local port and connect it to `config.addr`
    #[instrument(name = "network_sink_new", skip(name, config), fields(target = %config.addr))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(config.addr).await?;

        let name = name.into();
        debug!(sink = %name, local = ?socket.local_addr().ok(), "UDP sink ready");

        Ok(Self {
            name,
            config,
            socket: Some(socket),
            oversize_count: 0,
        })
    }

    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_write(&name, e.to_string()))?;

        match Self::new(name.clone(), config).await {
            Ok(sink) => Ok(sink),
            Err(e) => Err(ContractError::SinkConnection {
                sink_name: name,
                message: e.to_string(),
            }),
        }
    }

    /// Datagrams skipped for exceeding `max_packet_size`
    pub fn oversize_count(&self) -> u64 {
        self.oversize_count
    }
}

impl ScanSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_write",
        skip(self, scan),
        fields(sink = %self.name, scan_id = scan.scan_id)
    )]
    async fn write(&mut self, scan: &RingScan) -> Result<(), ContractError> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(ContractError::sink_write(&self.name, "socket closed"));
        };
        let datagram = self
            .config
            .encode(scan)
            .map_err(|e| ContractError::sink_write(&self.name, e))?;

        if datagram.len() > self.config.max_packet_size {
            self.oversize_count += 1;
            warn!(
                bytes = datagram.len(),
                limit = self.config.max_packet_size,
                "Datagram over limit, skipped"
            );
            return Ok(());
        }

        // Delivery is not guaranteed; a failed send is logged, not surfaced
        if let Err(e) = socket.send(&datagram).await {
            warn!(error = %e, "UDP send failed");
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket.take();
        debug!(sink = %self.name, oversize = self.oversize_count, "UDP sink closed");
        Ok(())
    }
}
