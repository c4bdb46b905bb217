//! Probe trait and probe result types

use crate::status::ProbeStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use vigil_core::Result;

/// Outcome of one probe invocation
///
/// Immutable once constructed; `status` is always set, everything else is
/// optional metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Probe status
    pub status: ProbeStatus,
    /// When the result was produced
    pub timestamp: DateTime<Utc>,
    /// Human-readable summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Measured probe latency in milliseconds
    #[serde(rename = "responseTime", skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Structured detail map, populated only when verbose detail is requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

impl ProbeResult {
    fn with_status(status: ProbeStatus) -> Self {
        Self {
            status,
            timestamp: Utc::now(),
            output: None,
            response_time_ms: None,
            details: None,
        }
    }

    /// Create a passing result
    pub fn pass() -> Self {
        Self::with_status(ProbeStatus::Pass)
    }

    /// Create a degraded result
    pub fn warn() -> Self {
        Self::with_status(ProbeStatus::Warn)
    }

    /// Create a failed result with a message
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            output: Some(message.into()),
            ..Self::with_status(ProbeStatus::Fail)
        }
    }

    /// Set the human-readable summary
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the measured latency in milliseconds
    pub fn with_response_time(mut self, millis: u64) -> Self {
        self.response_time_ms = Some(millis);
        self
    }

    /// Set the structured detail map
    pub fn with_details(mut self, details: HashMap<String, serde_json::Value>) -> Self {
        self.details = Some(details);
        self
    }
}

/// A named unit of work that assesses one aspect of service health
///
/// Implementations may fail by returning `Err`; the evaluator converts any
/// failure into a `fail` [`ProbeResult`] rather than letting it abort the
/// evaluation.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Run the probe once and produce a result
    async fn run(&self) -> Result<ProbeResult>;
}

type ProbeFn = Box<dyn Fn() -> BoxFuture<'static, Result<ProbeResult>> + Send + Sync>;

/// Adapter that turns an async closure into a [`Probe`]
///
/// Lets hosts register plain closures without defining a new type per check.
pub struct FnProbe {
    f: ProbeFn,
}

impl FnProbe {
    /// Wrap an async closure as a probe
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<ProbeResult>> + Send + 'static,
    {
        Self {
            f: Box::new(move || Box::pin(f())),
        }
    }
}

#[async_trait]
impl Probe for FnProbe {
    async fn run(&self) -> Result<ProbeResult> {
        (self.f)().await
    }
}

impl fmt::Debug for FnProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProbe").finish_non_exhaustive()
    }
}
