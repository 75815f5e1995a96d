pub mod archive;
pub mod email;
pub mod templates;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::submission::record::Envelope;

/// Settled outcome of one sink delivery.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SinkResult {
    pub sink: String,
    pub ok: bool,
    pub detail: String,
}

impl SinkResult {
    pub fn success(sink: &str, detail: impl Into<String>) -> Self {
        SinkResult {
            sink: sink.to_string(),
            ok: true,
            detail: detail.into(),
        }
    }

    pub fn failure(sink: &str, detail: impl Into<String>) -> Self {
        SinkResult {
            sink: sink.to_string(),
            ok: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug)]
pub enum SinkError {
    Timeout(String),
    Transport(String),
    NonSuccessStatus { status: u16, body: String },
    Build(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Timeout(msg) => write!(f, "timed out: {msg}"),
            SinkError::Transport(msg) => write!(f, "transport failure: {msg}"),
            SinkError::NonSuccessStatus { status, body } => {
                write!(f, "non-success status {status}: {body}")
            }
            SinkError::Build(msg) => write!(f, "failed to build request: {msg}"),
        }
    }
}

impl std::error::Error for SinkError {}

/// A notification channel a validated submission is delivered to.
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one envelope. Errors stay inside the sink; see [`Sink::send`].
    async fn deliver(&self, envelope: &Envelope) -> Result<String, SinkError>;

    /// Deliver and fold any failure into a [`SinkResult`].
    async fn send(&self, envelope: &Envelope) -> SinkResult {
        match self.deliver(envelope).await {
            Ok(detail) => SinkResult::success(self.name(), detail),
            Err(e) => SinkResult::failure(self.name(), e.to_string()),
        }
    }
}

/// Sinks in registration order.
#[derive(Clone, Default)]
pub struct SinkSet {
    sinks: Vec<Arc<dyn Sink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sink: Arc<dyn Sink>) {
        self.sinks.push(sink);
    }

    pub fn with(mut self, sink: Arc<dyn Sink>) -> Self {
        self.register(sink);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sinks.iter().any(|s| s.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Sink>> {
        self.sinks.iter()
    }
}
