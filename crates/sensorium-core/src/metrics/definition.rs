use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default histogram bounds, in seconds
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Kind of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonically non-decreasing value
    Counter,
    /// Freely settable value
    Gauge,
    /// Distribution over fixed buckets
    Histogram,
}

impl MetricKind {
    /// Name used in `# TYPE` lines
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Histogram upper bounds. `+Inf` is implicit and never listed.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets(Arc<[f64]>);

impl Default for Buckets {
    fn default() -> Self {
        Self(Arc::from(&DEFAULT_BUCKETS[..]))
    }
}

impl Buckets {
    /// Explicit bounds, taken as given. The registry validates them.
    #[must_use]
    pub fn new(bounds: Vec<f64>) -> Self {
        Self(Arc::from(bounds))
    }

    /// `count` bounds starting at `start`, each `width` apart
    #[must_use]
    pub fn linear(start: f64, width: f64, count: usize) -> Self {
        Self::new((0..count).map(|i| start + width * i as f64).collect())
    }

    /// `count` bounds starting at `start`, each `factor` times the previous
    #[must_use]
    pub fn exponential(start: f64, factor: f64, count: usize) -> Self {
        let mut bounds = Vec::with_capacity(count);
        let mut next = start;
        for _ in 0..count {
            bounds.push(next);
            next *= factor;
        }
        Self::new(bounds)
    }

    /// The bounds, in order
    #[must_use]
    pub fn bounds(&self) -> &[f64] {
        &self.0
    }

    pub(crate) fn shared(&self) -> Arc<[f64]> {
        Arc::clone(&self.0)
    }

    /// Reason the bounds are unusable, if any
    pub(crate) fn problem(&self) -> Option<&'static str> {
        if self.0.is_empty() {
            return Some("no bucket bounds");
        }
        if self.0.iter().any(|b| !b.is_finite()) {
            return Some("bucket bounds must be finite");
        }
        if self.0.windows(2).any(|w| w[0] >= w[1]) {
            return Some("bucket bounds must be strictly increasing");
        }
        None
    }
}

/// Description of one metric: name, kind, help text and label schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    name: String,
    kind: MetricKind,
    help: String,
    label_names: Vec<String>,
    namespace: String,
    subsystem: String,
    buckets: Option<Buckets>,
}

impl MetricDefinition {
    fn new(name: impl Into<String>, kind: MetricKind, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            help: help.into(),
            label_names: Vec::new(),
            namespace: String::new(),
            subsystem: String::new(),
            buckets: (kind == MetricKind::Histogram).then(Buckets::default),
        }
    }

    /// A counter definition
    #[must_use]
    pub fn counter(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Counter, help)
    }

    /// A gauge definition
    #[must_use]
    pub fn gauge(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Gauge, help)
    }

    /// A histogram definition with the default buckets
    #[must_use]
    pub fn histogram(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Histogram, help)
    }

    /// Set the label schema
    #[must_use]
    pub fn with_labels<S: AsRef<str>>(mut self, label_names: &[S]) -> Self {
        self.label_names = label_names.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Set namespace and subsystem prefixes (empty segments are omitted)
    #[must_use]
    pub fn with_prefix(mut self, namespace: impl Into<String>, subsystem: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self.subsystem = subsystem.into();
        self
    }

    /// Override histogram buckets. Ignored for other kinds.
    #[must_use]
    pub fn with_buckets(mut self, buckets: Buckets) -> Self {
        if self.kind == MetricKind::Histogram {
            self.buckets = Some(buckets);
        }
        self
    }

    /// Short name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind
    #[must_use]
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Help text
    #[must_use]
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Label names, in schema order
    #[must_use]
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Namespace prefix
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Subsystem prefix
    #[must_use]
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Histogram buckets (`None` for counters and gauges)
    #[must_use]
    pub fn buckets(&self) -> Option<&Buckets> {
        self.buckets.as_ref()
    }

    /// `{namespace}_{subsystem}_{name}` with empty segments omitted
    #[must_use]
    pub fn fq_name(&self) -> String {
        [self.namespace.as_str(), self.subsystem.as_str(), self.name.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Handle to a registered definition, returned by the registry.
///
/// Copyable and cheap; the store indexes its series families with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricHandle {
    pub(crate) registry: u64,
    pub(crate) index: usize,
    pub(crate) kind: MetricKind,
}

impl MetricHandle {
    /// Kind of the referenced metric
    #[must_use]
    pub fn kind(&self) -> MetricKind {
        self.kind
    }
}
