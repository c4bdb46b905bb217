//! Configuration for the health evaluator and endpoint

use crate::probe::{FnProbe, Probe, ProbeResult};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use vigil_core::Result;

/// Configuration for [`HealthEvaluator`](crate::HealthEvaluator) and
/// [`HealthReporter`](crate::HealthReporter)
#[derive(Clone)]
pub struct HealthConfig {
    /// Request path that triggers a health report
    pub endpoint: String,
    /// Service name reported in the health report
    pub service: String,
    /// Service version reported in the health report
    pub version: String,
    /// Deployment environment reported in the health report
    pub environment: String,
    /// Whether the system probe populates its structured detail map
    pub include_details: bool,
    /// Bounded wait per probe; a probe exceeding it is reported as failed
    pub probe_timeout: Duration,
    /// Probes registered at construction time
    pub checks: Vec<(String, Arc<dyn Probe>)>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            endpoint: "/health".to_string(),
            service: "service".to_string(),
            version: "0.0.0".to_string(),
            environment: "development".to_string(),
            include_details: true,
            probe_timeout: Duration::from_secs(10),
            checks: Vec::new(),
        }
    }
}

impl HealthConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request path that triggers a health report
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the reported service identity
    pub fn with_service(
        mut self,
        service: impl Into<String>,
        version: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        self.service = service.into();
        self.version = version.into();
        self.environment = environment.into();
        self
    }

    /// Set whether the system probe populates its detail map
    pub fn with_details(mut self, include_details: bool) -> Self {
        self.include_details = include_details;
        self
    }

    /// Set the bounded wait per probe
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Register a probe at construction time
    pub fn with_check(mut self, name: impl Into<String>, probe: Arc<dyn Probe>) -> Self {
        self.checks.push((name.into(), probe));
        self
    }

    /// Register an async closure as a probe at construction time
    pub fn with_check_fn<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<ProbeResult>> + Send + 'static,
    {
        self.with_check(name, Arc::new(FnProbe::new(f)))
    }
}

impl fmt::Debug for HealthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthConfig")
            .field("endpoint", &self.endpoint)
            .field("service", &self.service)
            .field("version", &self.version)
            .field("environment", &self.environment)
            .field("include_details", &self.include_details)
            .field("probe_timeout", &self.probe_timeout)
            .field("checks", &self.checks.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}
