//! Health endpoint middleware

use crate::config::HealthConfig;
use crate::evaluator::HealthEvaluator;
use crate::status::ProbeStatus;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use http::{header, Request, Response, StatusCode};
use http_body_util::Full;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};
use vigil_core::{Body, Middleware, Next, ResponseBuilder, Result};

/// Middleware that answers health requests and passes everything else on
///
/// Requests whose path equals the configured endpoint trigger an
/// evaluation; the report is served as JSON with `200` when the overall
/// status is `pass` and `503` otherwise. All other requests are delegated
/// to the rest of the chain untouched.
#[derive(Clone)]
pub struct HealthReporter {
    endpoint: String,
    evaluator: Arc<HealthEvaluator>,
}

impl HealthReporter {
    /// Create a reporter, constructing the evaluator from `config`
    pub fn new(config: HealthConfig) -> Self {
        let endpoint = config.endpoint.clone();
        Self {
            endpoint,
            evaluator: Arc::new(HealthEvaluator::new(config)),
        }
    }

    /// Create a reporter around an existing evaluator
    pub fn with_evaluator(endpoint: impl Into<String>, evaluator: Arc<HealthEvaluator>) -> Self {
        Self {
            endpoint: endpoint.into(),
            evaluator,
        }
    }

    /// The evaluator backing this endpoint, for probe registration
    pub fn evaluator(&self) -> &Arc<HealthEvaluator> {
        &self.evaluator
    }

    async fn render(&self) -> Result<Response<Body>> {
        let report = self.evaluator.evaluate().await;
        let overall = report.overall_status();

        debug!(
            status = %overall,
            endpoint = %self.endpoint,
            checks = report.checks.len(),
            "Health report served"
        );

        ResponseBuilder::new(overall.to_status_code()).json(&report)
    }

    /// Minimal 500 body for a defect in report shaping itself; the
    /// underlying error stays in the log, never in the response
    fn failure_response(&self) -> Response<Body> {
        let body = serde_json::json!({
            "service": self.evaluator.service(),
            "status": ProbeStatus::Fail,
            "timestamp": Utc::now(),
            "error": "Health check failed",
        })
        .to_string();

        // assembled from parts so no fallible builder sits on this path
        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        response
    }
}

#[async_trait]
impl Middleware for HealthReporter {
    async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        if req.uri().path() != self.endpoint {
            return next.run(req).await;
        }

        match self.render().await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!(error = %e, endpoint = %self.endpoint, "Health evaluation failed");
                Ok(self.failure_response())
            }
        }
    }
}

impl fmt::Debug for HealthReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthReporter")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
