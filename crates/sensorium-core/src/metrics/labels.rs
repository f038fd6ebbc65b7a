//! Label sets, label value normalization and exposition label rendering.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Runs of whitespace, `<`, `>` and `:` collapse into one underscore.
static NORMALIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[<>:\s]+").expect("NORMALIZE_RE is a compile-time constant")
});

static METRIC_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("METRIC_NAME_RE is a compile-time constant")
});

static LABEL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("LABEL_NAME_RE is a compile-time constant")
});

/// Prefix that host runtimes put in front of stream display labels.
const STREAM_PREFIX: &str = "Stream:";

/// Normalize a free-form display string into a bounded label value.
///
/// Strips a leading `Stream:` prefix, collapses runs of whitespace, `<`, `>`
/// and `:` into `_`, trims underscores from both ends and lower-cases the
/// result. Applying it twice gives the same value as applying it once.
pub fn normalize(value: &str) -> String {
    let stripped = value.strip_prefix(STREAM_PREFIX).unwrap_or(value);
    NORMALIZE_RE
        .replace_all(stripped, "_")
        .trim_matches('_')
        .to_lowercase()
}

/// Whether `name` is a legal metric name in the exposition format
pub fn is_valid_metric_name(name: &str) -> bool {
    METRIC_NAME_RE.is_match(name)
}

/// Whether `name` is a legal label name (`__` prefixes are reserved)
pub fn is_valid_label_name(name: &str) -> bool {
    LABEL_NAME_RE.is_match(name) && !name.starts_with("__")
}

/// Ordered label values identifying one series of a metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    /// The empty label set used by unlabeled metrics
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Label values in schema order
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> From<&[S]> for LabelSet {
    fn from(values: &[S]) -> Self {
        Self(values.iter().map(|v| v.as_ref().to_string()).collect())
    }
}

impl From<Vec<String>> for LabelSet {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Escape a label value: backslash, double quote and newline.
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Format label pairs as exposition label string: `{key1="val1",key2="val2"}`
pub fn format_labels<K: AsRef<str>, V: AsRef<str>>(labels: &[(K, V)]) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k.as_ref(), escape_label_value(v.as_ref())))
        .collect();
    format!("{{{}}}", parts.join(","))
}
