//! Concurrent probe evaluation and report assembly

use crate::config::HealthConfig;
use crate::probe::{Probe, ProbeResult};
use crate::registry::ProbeRegistry;
use crate::status::{aggregate, ProbeStatus};
use crate::system::{SystemProbe, SYSTEM_PROBE_NAME};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use vigil_core::Result;

/// One complete, self-consistent health snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Deployment environment
    pub environment: String,
    /// When the report was assembled
    pub timestamp: DateTime<Utc>,
    /// Milliseconds since the evaluator was constructed
    pub uptime: u64,
    /// Per-probe results keyed by probe name; always contains `"system"`
    pub checks: HashMap<String, ProbeResult>,
}

impl HealthReport {
    /// Escalated combination of all probe statuses in this report
    pub fn overall_status(&self) -> ProbeStatus {
        aggregate(self.checks.values().map(|r| r.status))
    }
}

/// Runs the system probe plus every registered probe concurrently and
/// assembles a [`HealthReport`]
///
/// Probe failures are isolated: an `Err`, a timeout, or a panic inside one
/// probe becomes a `fail` entry in the report and never aborts the
/// evaluation or any sibling probe.
#[derive(Debug)]
pub struct HealthEvaluator {
    config: HealthConfig,
    registry: ProbeRegistry,
    system: Arc<SystemProbe>,
    started: Instant,
}

impl HealthEvaluator {
    /// Create an evaluator, registering any probes carried in the config
    ///
    /// The start instant used for `uptime` is captured here, once.
    pub fn new(mut config: HealthConfig) -> Self {
        let registry = ProbeRegistry::new();
        for (name, probe) in config.checks.drain(..) {
            registry.add(name, probe);
        }

        let system = Arc::new(SystemProbe::new(config.include_details));

        Self {
            config,
            registry,
            system,
            started: Instant::now(),
        }
    }

    /// The registry of custom probes
    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    /// The configured service name
    pub fn service(&self) -> &str {
        &self.config.service
    }

    /// Register a named probe
    pub fn add_check(&self, name: impl Into<String>, probe: Arc<dyn Probe>) {
        self.registry.add(name, probe);
    }

    /// Register an async closure as a named probe
    pub fn add_check_fn<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<ProbeResult>> + Send + 'static,
    {
        self.registry.add_fn(name, f);
    }

    /// Remove the first probe registered under `name`; returns whether a
    /// removal occurred
    pub fn remove_check(&self, name: &str) -> bool {
        self.registry.remove(name)
    }

    /// Names of all registered probes, in registration order
    pub fn check_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Run all probes concurrently and assemble a fresh report
    ///
    /// Every probe in the registry snapshot contributes exactly one entry to
    /// `checks`. With duplicate names, entries are written in registration
    /// order, so the last-registered duplicate's result wins.
    pub async fn evaluate(&self) -> HealthReport {
        let snapshot = self.registry.snapshot();
        let bound = self.config.probe_timeout;

        let mut names = Vec::with_capacity(snapshot.len() + 1);
        let mut handles = Vec::with_capacity(snapshot.len() + 1);

        names.push(SYSTEM_PROBE_NAME.to_string());
        handles.push(tokio::spawn(Self::run_probe(
            Arc::clone(&self.system) as Arc<dyn Probe>,
            bound,
        )));

        for entry in snapshot {
            names.push(entry.name);
            handles.push(tokio::spawn(Self::run_probe(entry.probe, bound)));
        }

        // Wait for all, never fail-fast.
        let outcomes = join_all(handles).await;

        let mut checks = HashMap::with_capacity(names.len());
        for (name, outcome) in names.into_iter().zip(outcomes) {
            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    let message = if e.is_panic() {
                        panic_message(e.into_panic())
                    } else {
                        "Unknown error".to_string()
                    };
                    tracing::warn!(probe = %name, message = %message, "Probe task aborted");
                    ProbeResult::fail(message)
                }
            };
            checks.insert(name, result);
        }

        HealthReport {
            service: self.config.service.clone(),
            version: self.config.version.clone(),
            environment: self.config.environment.clone(),
            timestamp: Utc::now(),
            uptime: self.started.elapsed().as_millis() as u64,
            checks,
        }
    }

    /// Run one probe within the configured bound, converting any failure
    /// into a `fail` result
    ///
    /// When the bound elapses the failure result is used regardless of
    /// whether the underlying probe later completes; the late result is
    /// discarded.
    async fn run_probe(probe: Arc<dyn Probe>, bound: Duration) -> ProbeResult {
        let start = Instant::now();
        match tokio::time::timeout(bound, probe.run()).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                let message = e.to_string();
                let message = if message.is_empty() {
                    "Unknown error".to_string()
                } else {
                    message
                };
                ProbeResult::fail(message).with_response_time(start.elapsed().as_millis() as u64)
            }
            Err(_) => ProbeResult::fail("timed out")
                .with_response_time(start.elapsed().as_millis() as u64),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::Error;

    fn evaluator() -> HealthEvaluator {
        HealthEvaluator::new(
            HealthConfig::new()
                .with_service("test-service", "1.0.0", "test")
                .with_probe_timeout(Duration::from_millis(250)),
        )
    }

    #[tokio::test]
    async fn test_report_always_contains_system() {
        let evaluator = evaluator();
        let report = evaluator.evaluate().await;

        assert_eq!(report.checks.len(), 1);
        assert!(report.checks.contains_key("system"));
        assert_eq!(report.checks["system"].status, ProbeStatus::Pass);
        assert_eq!(report.overall_status(), ProbeStatus::Pass);
        assert_eq!(report.service, "test-service");
    }

    #[tokio::test]
    async fn test_failing_probe_is_isolated() {
        let evaluator = evaluator();
        evaluator.add_check_fn("good", || async { Ok(ProbeResult::pass()) });
        evaluator
            .add_check_fn("bad", || async { Err(Error::Generic("boom".to_string())) });

        let report = evaluator.evaluate().await;

        assert_eq!(report.checks.len(), 3);
        assert_eq!(report.checks["good"].status, ProbeStatus::Pass);
        assert_eq!(report.checks["bad"].status, ProbeStatus::Fail);
        assert_eq!(report.checks["bad"].output.as_deref(), Some("boom"));
        assert_eq!(report.overall_status(), ProbeStatus::Fail);
    }

    #[tokio::test]
    async fn test_probe_error_message_reaches_report() {
        let evaluator = evaluator();
        evaluator.add_check_fn("database", || async {
            Err(Error::probe("database", "connection refused"))
        });

        let report = evaluator.evaluate().await;

        assert_eq!(report.checks["database"].status, ProbeStatus::Fail);
        assert_eq!(
            report.checks["database"].output.as_deref(),
            Some("Probe 'database' failed: connection refused")
        );
    }

    #[tokio::test]
    async fn test_panicking_probe_is_isolated() {
        let evaluator = evaluator();
        evaluator.add_check_fn("steady", || async { Ok(ProbeResult::pass()) });
        evaluator.add_check_fn("panicky", || async { panic!("probe blew up") });

        let report = evaluator.evaluate().await;

        assert_eq!(report.checks["steady"].status, ProbeStatus::Pass);
        assert_eq!(report.checks["panicky"].status, ProbeStatus::Fail);
        assert_eq!(
            report.checks["panicky"].output.as_deref(),
            Some("probe blew up")
        );
    }

    #[tokio::test]
    async fn test_slow_probe_times_out() {
        let evaluator = HealthEvaluator::new(
            HealthConfig::new().with_probe_timeout(Duration::from_millis(50)),
        );
        evaluator.add_check_fn("slow", || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ProbeResult::pass())
        });

        let start = Instant::now();
        let report = evaluator.evaluate().await;

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(report.checks["slow"].status, ProbeStatus::Fail);
        assert_eq!(report.checks["slow"].output.as_deref(), Some("timed out"));
    }

    #[tokio::test]
    async fn test_duplicate_names_last_registered_wins() {
        let evaluator = evaluator();
        evaluator.add_check_fn("dup", || async {
            Ok(ProbeResult::pass().with_output("first"))
        });
        evaluator.add_check_fn("dup", || async {
            Ok(ProbeResult::warn().with_output("second"))
        });

        let report = evaluator.evaluate().await;

        // one entry for the name, holding the later registration's result
        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.checks["dup"].status, ProbeStatus::Warn);
        assert_eq!(report.checks["dup"].output.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_warn_escalates_overall_without_fail() {
        let evaluator = evaluator();
        evaluator.add_check_fn("degraded", || async { Ok(ProbeResult::warn()) });

        let report = evaluator.evaluate().await;
        assert_eq!(report.overall_status(), ProbeStatus::Warn);
    }

    #[tokio::test]
    async fn test_uptime_is_monotonic() {
        let evaluator = evaluator();
        let first = evaluator.evaluate().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = evaluator.evaluate().await;

        assert!(second.uptime >= first.uptime);
    }

    #[tokio::test]
    async fn test_config_seeded_checks_are_registered() {
        let evaluator = HealthEvaluator::new(
            HealthConfig::new().with_check_fn("seeded", || async { Ok(ProbeResult::pass()) }),
        );

        assert_eq!(evaluator.check_names(), vec!["seeded"]);
        let report = evaluator.evaluate().await;
        assert!(report.checks.contains_key("seeded"));
    }

    #[tokio::test]
    async fn test_remove_check_semantics() {
        let evaluator = evaluator();
        evaluator.add_check_fn("x", || async { Ok(ProbeResult::pass()) });

        assert!(!evaluator.remove_check("y"));
        assert_eq!(evaluator.check_names(), vec!["x"]);

        assert!(evaluator.remove_check("x"));
        assert!(evaluator.check_names().is_empty());

        let report = evaluator.evaluate().await;
        assert_eq!(report.checks.len(), 1);
        assert!(report.checks.contains_key("system"));
    }
}
