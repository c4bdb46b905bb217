//! Built-in probe that samples process-level metrics

use crate::probe::{Probe, ProbeResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Instant;
use sysinfo::{ProcessesToUpdate, System};
use vigil_core::{Error, Result};

/// Registry key the system probe's result is stored under
pub const SYSTEM_PROBE_NAME: &str = "system";

/// Format a byte count as a human-readable base-1024 string
///
/// Up to two decimal places with trailing zeros trimmed: `1024` formats as
/// `"1 KB"` and `1536` as `"1.5 KB"`. Zero is `"0 Bytes"`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent])
}

/// Built-in probe reporting memory, CPU, and uptime for the current process
///
/// Always produces a result: a failure while sampling the process table is
/// converted into a `fail` result instead of escaping as an error.
pub struct SystemProbe {
    system: Mutex<System>,
    include_details: bool,
}

impl SystemProbe {
    /// Create a system probe
    ///
    /// `include_details` gates whether the structured detail map is
    /// populated on success.
    pub fn new(include_details: bool) -> Self {
        Self {
            system: Mutex::new(System::new()),
            include_details,
        }
    }

    fn sample(&self) -> Result<HashMap<String, serde_json::Value>> {
        let pid = sysinfo::get_current_pid().map_err(|e| Error::probe(SYSTEM_PROBE_NAME, e))?;

        let mut system = self.system.lock();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let process = system.process(pid).ok_or_else(|| {
            Error::probe(
                SYSTEM_PROBE_NAME,
                format!("process {pid} not found in system table"),
            )
        })?;

        let details = HashMap::from([
            (
                "memory".to_string(),
                serde_json::json!({
                    "rss": format_bytes(process.memory()),
                    "virtualMemory": format_bytes(process.virtual_memory()),
                }),
            ),
            (
                "cpuPercent".to_string(),
                serde_json::json!(f64::from(process.cpu_usage())),
            ),
            ("uptime".to_string(), serde_json::json!(process.run_time())),
            ("pid".to_string(), serde_json::json!(pid.as_u32())),
            (
                "platform".to_string(),
                serde_json::json!(format!(
                    "{}-{}",
                    std::env::consts::OS,
                    std::env::consts::ARCH
                )),
            ),
            (
                "os".to_string(),
                serde_json::json!(
                    System::long_os_version().unwrap_or_else(|| "unknown".to_string())
                ),
            ),
        ]);

        Ok(details)
    }
}

impl std::fmt::Debug for SystemProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemProbe")
            .field("include_details", &self.include_details)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Probe for SystemProbe {
    async fn run(&self) -> Result<ProbeResult> {
        let start = Instant::now();

        let result = match self.sample() {
            Ok(details) => {
                let mut result = ProbeResult::pass()
                    .with_output("System is healthy")
                    .with_response_time(start.elapsed().as_millis() as u64);
                if self.include_details {
                    result = result.with_details(details);
                }
                result
            }
            Err(e) => {
                tracing::warn!(error = %e, "System probe failed to sample process metrics");
                ProbeResult::fail(e.to_string())
                    .with_response_time(start.elapsed().as_millis() as u64)
            }
        };

        Ok(result)
    }
}
