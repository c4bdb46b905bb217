//! Probe status and overall-status aggregation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single probe, ordered by severity
///
/// The derived `Ord` is the escalation lattice: `Pass < Warn < Fail`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// The checked aspect is healthy
    Pass,
    /// The checked aspect is degraded but serviceable
    Warn,
    /// The checked aspect is unhealthy
    Fail,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Pass => write!(f, "pass"),
            ProbeStatus::Warn => write!(f, "warn"),
            ProbeStatus::Fail => write!(f, "fail"),
        }
    }
}

impl ProbeStatus {
    /// HTTP status code a report with this overall status is served with
    pub fn to_status_code(self) -> http::StatusCode {
        match self {
            ProbeStatus::Pass => http::StatusCode::OK,
            ProbeStatus::Warn | ProbeStatus::Fail => http::StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Combine per-probe statuses into one overall status
///
/// The overall status is the maximum element of the escalation lattice:
/// any `Fail` makes the whole service `Fail`, else any `Warn` makes it
/// `Warn`, else it is `Pass`. The empty input aggregates to `Pass`.
pub fn aggregate<I>(statuses: I) -> ProbeStatus
where
    I: IntoIterator<Item = ProbeStatus>,
{
    statuses
        .into_iter()
        .max()
        .unwrap_or(ProbeStatus::Pass)
}
