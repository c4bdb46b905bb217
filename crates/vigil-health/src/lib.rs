//! # Vigil Health
//!
//! Unified health reporting for a running service:
//! - Named async probes registered at runtime
//! - Concurrent, failure-isolated evaluation with per-probe timeouts
//! - Status escalation (`fail` > `warn` > `pass`) into one overall verdict
//! - A built-in process probe (memory, CPU, uptime, platform)
//! - A middleware endpoint serving the report as JSON with 200/503
//!
//! ```no_run
//! use std::sync::Arc;
//! use vigil_core::{Middleware, Next};
//! use vigil_health::{HealthConfig, HealthReporter, ProbeResult};
//!
//! let reporter = HealthReporter::new(
//!     HealthConfig::new()
//!         .with_service("billing", "2.3.1", "production")
//!         .with_check_fn("database", || async {
//!             // ping the database here
//!             Ok(ProbeResult::pass().with_output("pool ok"))
//!         }),
//! );
//!
//! // mount it in the host's middleware chain
//! let chain: Arc<[Arc<dyn Middleware>]> = Arc::new([Arc::new(reporter) as Arc<dyn Middleware>]);
//! let _next = Next::new(chain);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod config;
pub mod evaluator;
pub mod probe;
pub mod registry;
pub mod reporter;
pub mod status;
pub mod system;

pub use config::HealthConfig;
pub use evaluator::{HealthEvaluator, HealthReport};
pub use probe::{FnProbe, Probe, ProbeResult};
pub use registry::ProbeRegistry;
pub use reporter::HealthReporter;
pub use status::{aggregate, ProbeStatus};
pub use system::{format_bytes, SystemProbe, SYSTEM_PROBE_NAME};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::HealthConfig;
    pub use crate::evaluator::{HealthEvaluator, HealthReport};
    pub use crate::probe::{FnProbe, Probe, ProbeResult};
    pub use crate::registry::ProbeRegistry;
    pub use crate::reporter::HealthReporter;
    pub use crate::status::{aggregate, ProbeStatus};
    pub use crate::system::SystemProbe;
}
