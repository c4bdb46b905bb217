//! Ordered registry of named probes

use crate::probe::{FnProbe, Probe, ProbeResult};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use vigil_core::Result;

/// A probe together with its registered name
#[derive(Clone)]
pub(crate) struct RegisteredProbe {
    pub(crate) name: String,
    pub(crate) probe: Arc<dyn Probe>,
}

impl fmt::Debug for RegisteredProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredProbe")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered, mutable collection of named probes
///
/// The registry is a sequence, not a set: names are not required to be
/// unique. Duplicate names each run during evaluation, and because the
/// report's `checks` map is assembled in registration order, the
/// last-registered duplicate's result is the one that ends up in the report.
///
/// Cloning is cheap; clones share the same underlying sequence.
#[derive(Debug, Clone, Default)]
pub struct ProbeRegistry {
    probes: Arc<RwLock<Vec<RegisteredProbe>>>,
}

impl ProbeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a probe to the sequence
    pub fn add(&self, name: impl Into<String>, probe: Arc<dyn Probe>) {
        let name = name.into();
        tracing::debug!(probe = %name, "Registered health probe");
        self.probes.write().push(RegisteredProbe { name, probe });
    }

    /// Append an async closure as a probe
    pub fn add_fn<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<ProbeResult>> + Send + 'static,
    {
        self.add(name, Arc::new(FnProbe::new(f)));
    }

    /// Remove the first probe with the given name, in registration order
    ///
    /// Returns whether a removal occurred.
    pub fn remove(&self, name: &str) -> bool {
        let mut probes = self.probes.write();
        match probes.iter().position(|p| p.name == name) {
            Some(index) => {
                probes.remove(index);
                tracing::debug!(probe = %name, "Removed health probe");
                true
            }
            None => false,
        }
    }

    /// Names of all registered probes, in registration order
    pub fn names(&self) -> Vec<String> {
        self.probes.read().iter().map(|p| p.name.clone()).collect()
    }

    /// Number of registered probes
    pub fn len(&self) -> usize {
        self.probes.read().len()
    }

    /// Whether the registry holds no probes
    pub fn is_empty(&self) -> bool {
        self.probes.read().is_empty()
    }

    /// Stable copy of the sequence, taken at the start of an evaluation so
    /// that concurrent add/remove cannot corrupt an in-flight fan-out
    pub(crate) fn snapshot(&self) -> Vec<RegisteredProbe> {
        self.probes.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_probe(registry: &ProbeRegistry, name: &str) {
        registry.add_fn(name, || async { Ok(ProbeResult::pass()) });
    }

    #[test]
    fn test_add_and_names_preserve_order() {
        let registry = ProbeRegistry::new();
        noop_probe(&registry, "database");
        noop_probe(&registry, "cache");
        noop_probe(&registry, "queue");

        assert_eq!(registry.names(), vec!["database", "cache", "queue"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_remove_missing_returns_false() {
        let registry = ProbeRegistry::new();
        noop_probe(&registry, "database");

        assert!(!registry.remove("cache"));
        assert_eq!(registry.names(), vec!["database"]);
    }

    #[test]
    fn test_remove_existing_returns_true() {
        let registry = ProbeRegistry::new();
        noop_probe(&registry, "database");
        noop_probe(&registry, "cache");

        assert!(registry.remove("database"));
        assert_eq!(registry.names(), vec!["cache"]);
        assert!(!registry.names().contains(&"database".to_string()));
    }

    #[test]
    fn test_duplicate_names_coexist_and_remove_takes_first() {
        let registry = ProbeRegistry::new();
        noop_probe(&registry, "dup");
        noop_probe(&registry, "other");
        noop_probe(&registry, "dup");

        assert_eq!(registry.names(), vec!["dup", "other", "dup"]);

        assert!(registry.remove("dup"));
        // the first "dup" is gone, the later one remains
        assert_eq!(registry.names(), vec!["other", "dup"]);
    }

    #[test]
    fn test_snapshot_is_stable_under_mutation() {
        let registry = ProbeRegistry::new();
        noop_probe(&registry, "a");
        noop_probe(&registry, "b");

        let snapshot = registry.snapshot();
        registry.remove("a");
        noop_probe(&registry, "c");

        let snapshot_names: Vec<_> = snapshot.iter().map(|p| p.name.clone()).collect();
        assert_eq!(snapshot_names, vec!["a", "b"]);
        assert_eq!(registry.names(), vec!["b", "c"]);
    }
}
