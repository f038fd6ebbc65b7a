use super::definition::{MetricDefinition, MetricHandle, MetricKind};
use super::labels::{is_valid_label_name, is_valid_metric_name};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

fn next_registry_id() -> u64 {
    NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Registry of metric definitions.
///
/// Filled once at startup, then frozen by handing it to a
/// [`SeriesStore`](super::SeriesStore). Definitions keep registration order.
/// Handles carry the id of the registry that issued them; other registries
/// reject them, while clones share the id.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    id: u64,
    definitions: Vec<MetricDefinition>,
    by_fq_name: HashMap<String, usize>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self {
            id: next_registry_id(),
            definitions: Vec::new(),
            by_fq_name: HashMap::new(),
        }
    }
}

impl MetricsRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition.
    ///
    /// Fails with [`Error::DuplicateMetric`] when the fully-qualified name is
    /// taken and [`Error::InvalidDefinition`] when names or buckets are
    /// unusable.
    pub fn register(&mut self, definition: MetricDefinition) -> Result<MetricHandle> {
        let fq_name = definition.fq_name();
        validate(&definition, &fq_name)?;

        if self.by_fq_name.contains_key(&fq_name) {
            return Err(Error::DuplicateMetric { name: fq_name });
        }

        let handle = MetricHandle {
            registry: self.id,
            index: self.definitions.len(),
            kind: definition.kind(),
        };
        debug!(metric = %fq_name, kind = %definition.kind(), "Registered metric");
        self.by_fq_name.insert(fq_name, handle.index);
        self.definitions.push(definition);
        Ok(handle)
    }

    /// Find a definition by fully-qualified name, falling back to the first
    /// definition with that short name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&MetricDefinition> {
        self.handle(name).and_then(|h| self.definition(h))
    }

    /// Handle for a fully-qualified or short name
    #[must_use]
    pub fn handle(&self, name: &str) -> Option<MetricHandle> {
        let index = self.by_fq_name.get(name).copied().or_else(|| {
            self.definitions
                .iter()
                .position(|d| d.name() == name)
        })?;
        Some(MetricHandle {
            registry: self.id,
            index,
            kind: self.definitions[index].kind(),
        })
    }

    /// Definition behind a handle
    #[must_use]
    pub fn definition(&self, handle: MetricHandle) -> Option<&MetricDefinition> {
        if !self.issued(handle) {
            return None;
        }
        self.definitions
            .get(handle.index)
            .filter(|d| d.kind() == handle.kind)
    }

    /// Whether `handle` came from this registry since its last reset
    #[must_use]
    pub fn issued(&self, handle: MetricHandle) -> bool {
        handle.registry == self.id
    }

    /// All definitions in registration order
    #[must_use]
    pub fn definitions(&self) -> &[MetricDefinition] {
        &self.definitions
    }

    /// Number of definitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Remove every definition. Calling it on an empty registry is a no-op.
    ///
    /// Handles issued before the reset are rejected afterwards.
    pub fn reset(&mut self) {
        if !self.definitions.is_empty() {
            debug!(count = self.definitions.len(), "Resetting metrics registry");
        }
        self.definitions.clear();
        self.by_fq_name.clear();
        self.id = next_registry_id();
    }
}

fn validate(definition: &MetricDefinition, fq_name: &str) -> Result<()> {
    let invalid = |reason: String| Error::InvalidDefinition {
        name: fq_name.to_string(),
        reason,
    };

    if !is_valid_metric_name(fq_name) {
        return Err(invalid("not a valid metric name".to_string()));
    }

    let mut seen = HashSet::new();
    for label in definition.label_names() {
        if !is_valid_label_name(label) {
            return Err(invalid(format!("invalid label name '{}'", label)));
        }
        if !seen.insert(label.as_str()) {
            return Err(invalid(format!("duplicate label name '{}'", label)));
        }
    }

    if definition.kind() == MetricKind::Histogram {
        if seen.contains("le") {
            return Err(invalid("histograms cannot use the 'le' label".to_string()));
        }
        match definition.buckets() {
            Some(buckets) => {
                if let Some(problem) = buckets.problem() {
                    return Err(invalid(problem.to_string()));
                }
            }
            None => return Err(invalid("histogram without buckets".to_string())),
        }
    }

    Ok(())
}
