//! Errors raised while wiring sinks.

use contracts::SinkType;
use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DispatcherError {
    /// The sink's backing resource (directory, socket) could not be opened
    #[error("sink '{name}' ({sink_type:?}) could not be opened: {source}")]
    SinkOpen {
        name: String,
        sink_type: SinkType,
        #[source]
        source: BoxedError,
    },

    #[error("sink '{name}': invalid {key} '{value}'")]
    InvalidParam {
        name: String,
        key: &'static str,
        value: String,
    },

    /// Two sinks share a name, so metrics and channel lookup would collide
    #[error("duplicate sink name '{0}'")]
    DuplicateSink(String),
}

impl DispatcherError {
    pub fn sink_open(
        name: impl Into<String>,
        sink_type: SinkType,
        source: impl Into<BoxedError>,
    ) -> Self {
        Self::SinkOpen {
            name: name.into(),
            sink_type,
            source: source.into(),
        }
    }
}
