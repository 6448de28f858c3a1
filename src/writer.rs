//! Bridge from `tracing` to the debug channel.
//!
//! [`DebugChannelWriter`] plugs into a `tracing_subscriber::fmt` layer so each
//! formatted event is delivered to the debug channel as a single write.

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::sink::{DebugChannel, Sink};
use crate::DebugStream;

/// Errors from logging setup
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to initialize logging: {0}")]
    Initialization(String),
}

/// `MakeWriter` producing one batched debug stream per event.
#[derive(Debug, Clone, Default)]
pub struct DebugChannelWriter<S = DebugChannel> {
    sink: S,
}

impl DebugChannelWriter {
    /// Writer delivering events to the debug channel.
    pub fn new() -> Self {
        Self { sink: DebugChannel }
    }
}

impl<S: Sink + Clone> DebugChannelWriter<S> {
    /// Writer delivering events to a custom sink.
    pub fn with_sink(sink: S) -> Self {
        Self { sink }
    }
}

impl<'a, S: Sink + Clone + 'a> MakeWriter<'a> for DebugChannelWriter<S> {
    type Writer = DebugStream<S>;

    fn make_writer(&'a self) -> Self::Writer {
        DebugStream::with_sink(self.sink.clone(), false)
    }
}

/// Install a global subscriber writing to the debug channel.
///
/// `RUST_LOG` takes precedence over `default_level`.
///
/// # Example
/// ```ignore
/// debug_stream::writer::init_logging("debug")?;
/// tracing::info!(port = 8080, "Listening");
/// ```
pub fn init_logging(default_level: &str) -> Result<(), LogError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let debug_layer = fmt::layer()
        .with_writer(DebugChannelWriter::new())
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(debug_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| LogError::Initialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::testing::Recorder;
    use std::sync::Arc;

    #[test]
    fn test_each_event_is_one_write() {
        let recorder = Arc::new(Recorder::default());
        let layer = fmt::layer()
            .with_writer(DebugChannelWriter::with_sink(recorder.clone()))
            .with_ansi(false)
            .without_time();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(answer = 42, "first event");
            tracing::warn!("second event");
        });

        let writes = recorder.writes();
        if crate::ENABLED {
            assert_eq!(writes.len(), 2);
            assert!(writes[0].contains("first event"));
            assert!(writes[0].contains("answer=42"));
            assert!(writes[0].ends_with('\n'));
            assert!(writes[1].contains("WARN"));
        } else {
            assert!(writes.is_empty());
        }
    }
}
