use super::definition::{MetricDefinition, MetricHandle, MetricKind};
use super::labels::LabelSet;
use super::registry::MetricsRegistry;
use super::types::{Counter, Gauge, Histogram, HistogramSnapshot};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::warn;

/// Series count at which a family logs a cardinality warning (once).
pub const CARDINALITY_WARN_THRESHOLD: usize = 1_000;

/// Mutable state of one series
#[derive(Debug, Clone)]
enum Series {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl Series {
    fn new(definition: &MetricDefinition) -> Self {
        match definition.kind() {
            MetricKind::Counter => Series::Counter(Counter::new()),
            MetricKind::Gauge => Series::Gauge(Gauge::new()),
            MetricKind::Histogram => Series::Histogram(Histogram::with_bounds(
                definition
                    .buckets()
                    .map(|b| b.shared())
                    .unwrap_or_default(),
            )),
        }
    }

    fn read(&self) -> SeriesValue {
        match self {
            Series::Counter(c) => SeriesValue::Counter(c.get()),
            Series::Gauge(g) => SeriesValue::Gauge(g.get()),
            Series::Histogram(h) => SeriesValue::Histogram(h.snapshot()),
        }
    }
}

/// Value of one series at snapshot time
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValue {
    /// Counter total
    Counter(f64),
    /// Gauge value
    Gauge(f64),
    /// Histogram buckets, sum and count
    Histogram(HistogramSnapshot),
}

impl SeriesValue {
    /// Scalar value of a counter or gauge
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SeriesValue::Counter(v) | SeriesValue::Gauge(v) => Some(*v),
            SeriesValue::Histogram(_) => None,
        }
    }

    /// Histogram contents
    #[must_use]
    pub fn as_histogram(&self) -> Option<&HistogramSnapshot> {
        match self {
            SeriesValue::Histogram(h) => Some(h),
            _ => None,
        }
    }
}

/// Every realized series of one definition, in first-observed order
#[derive(Debug, Clone)]
pub struct FamilySnapshot<'a> {
    /// The definition
    pub definition: &'a MetricDefinition,
    /// Its fully-qualified name
    pub fq_name: &'a str,
    /// `(labels, value)` per series
    pub series: Vec<(LabelSet, SeriesValue)>,
}

#[derive(Debug, Default)]
struct SeriesMap {
    index: HashMap<LabelSet, usize>,
    series: Vec<(LabelSet, Series)>,
}

#[derive(Debug)]
struct Family {
    definition: MetricDefinition,
    fq_name: String,
    series: RwLock<SeriesMap>,
    cardinality_warned: AtomicBool,
}

/// Series storage for a frozen registry.
///
/// Series are created on first mutation, exactly once per label set, and
/// never evicted. Every label value that reaches the store becomes a series
/// for the life of the store, so labels fed from unbounded upstream name
/// sets grow memory without limit; a warning is logged per family once it
/// reaches [`CARDINALITY_WARN_THRESHOLD`] series.
#[derive(Debug)]
pub struct SeriesStore {
    registry: MetricsRegistry,
    families: Vec<Family>,
}

impl SeriesStore {
    /// Freeze `registry` and build one empty family per definition
    #[must_use]
    pub fn new(registry: MetricsRegistry) -> Self {
        let families = registry
            .definitions()
            .iter()
            .map(|definition| Family {
                fq_name: definition.fq_name(),
                definition: definition.clone(),
                series: RwLock::new(SeriesMap::default()),
                cardinality_warned: AtomicBool::new(false),
            })
            .collect();
        Self { registry, families }
    }

    /// The frozen registry
    #[must_use]
    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }

    /// Add `delta` (>= 0) to a counter series
    pub fn counter_inc(&self, handle: MetricHandle, labels: &[&str], delta: f64) -> Result<()> {
        let family = self.family(handle, MetricKind::Counter)?;
        check_delta(family, delta)?;
        if let Series::Counter(counter) = self.series(family, labels)? {
            counter.inc_by(delta);
        }
        Ok(())
    }

    /// Set a gauge series
    pub fn gauge_set(&self, handle: MetricHandle, labels: &[&str], value: f64) -> Result<()> {
        let family = self.family(handle, MetricKind::Gauge)?;
        if let Series::Gauge(gauge) = self.series(family, labels)? {
            gauge.set(value);
        }
        Ok(())
    }

    /// Raise a gauge series by `delta` (>= 0)
    pub fn gauge_inc(&self, handle: MetricHandle, labels: &[&str], delta: f64) -> Result<()> {
        self.gauge_add(handle, labels, delta, 1.0)
    }

    /// Lower a gauge series by `delta` (>= 0)
    pub fn gauge_dec(&self, handle: MetricHandle, labels: &[&str], delta: f64) -> Result<()> {
        self.gauge_add(handle, labels, delta, -1.0)
    }

    fn gauge_add(&self, handle: MetricHandle, labels: &[&str], delta: f64, sign: f64) -> Result<()> {
        let family = self.family(handle, MetricKind::Gauge)?;
        check_delta(family, delta)?;
        if let Series::Gauge(gauge) = self.series(family, labels)? {
            gauge.add(sign * delta);
        }
        Ok(())
    }

    /// Record one observation in a histogram series
    pub fn histogram_observe(&self, handle: MetricHandle, labels: &[&str], value: f64) -> Result<()> {
        let family = self.family(handle, MetricKind::Histogram)?;
        if let Series::Histogram(histogram) = self.series(family, labels)? {
            histogram.observe(value);
        }
        Ok(())
    }

    /// Current value of one series, `None` if it was never mutated
    #[must_use]
    pub fn value(&self, handle: MetricHandle, labels: &[&str]) -> Option<SeriesValue> {
        let family = self.lookup(handle)?;
        let key = LabelSet::from(labels);
        let map = family.series.read().unwrap_or_else(|e| e.into_inner());
        let index = *map.index.get(&key)?;
        let series = map.series[index].1.clone();
        drop(map);
        Some(series.read())
    }

    /// Number of realized series for a metric
    #[must_use]
    pub fn series_count(&self, handle: MetricHandle) -> usize {
        self.lookup(handle)
            .map(|f| f.series.read().unwrap_or_else(|e| e.into_inner()).series.len())
            .unwrap_or(0)
    }

    /// Read every series, family by family in registration order.
    ///
    /// Each family's lock is held only while its series handles are cloned;
    /// values are read afterwards, one series at a time.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FamilySnapshot<'_>> {
        self.families
            .iter()
            .map(|family| {
                let handles: Vec<(LabelSet, Series)> = family
                    .series
                    .read()
                    .unwrap_or_else(|e| e.into_inner())
                    .series
                    .clone();
                FamilySnapshot {
                    definition: &family.definition,
                    fq_name: &family.fq_name,
                    series: handles
                        .into_iter()
                        .map(|(labels, series)| (labels, series.read()))
                        .collect(),
                }
            })
            .collect()
    }

    fn lookup(&self, handle: MetricHandle) -> Option<&Family> {
        if !self.registry.issued(handle) {
            return None;
        }
        self.families
            .get(handle.index)
            .filter(|f| f.definition.kind() == handle.kind)
    }

    fn family(&self, handle: MetricHandle, expected: MetricKind) -> Result<&Family> {
        let family = self
            .lookup(handle)
            .ok_or_else(|| Error::UnknownMetric(format!("handle #{}", handle.index)))?;

        if family.definition.kind() != expected {
            return Err(Error::KindMismatch {
                metric: family.fq_name.clone(),
                expected,
                actual: family.definition.kind(),
            });
        }
        Ok(family)
    }

    /// Get or create the series for `labels`, exactly once per label set
    fn series(&self, family: &Family, labels: &[&str]) -> Result<Series> {
        let expected = family.definition.label_names().len();
        if labels.len() != expected {
            return Err(Error::InvalidLabelArity {
                metric: family.fq_name.clone(),
                expected,
                actual: labels.len(),
            });
        }

        let key = LabelSet::from(labels);

        let map = family.series.read().unwrap_or_else(|e| e.into_inner());
        if let Some(&index) = map.index.get(&key) {
            return Ok(map.series[index].1.clone());
        }
        drop(map);

        let mut map = family.series.write().unwrap_or_else(|e| e.into_inner());
        // Another writer may have created it between the two locks.
        if let Some(&index) = map.index.get(&key) {
            return Ok(map.series[index].1.clone());
        }
        let series = Series::new(&family.definition);
        let index = map.series.len();
        map.index.insert(key.clone(), index);
        map.series.push((key, series.clone()));
        let realized = map.series.len();
        drop(map);

        if realized >= CARDINALITY_WARN_THRESHOLD
            && !family.cardinality_warned.swap(true, Ordering::Relaxed)
        {
            warn!(
                metric = %family.fq_name,
                series = realized,
                "Metric label cardinality is high; series are never evicted"
            );
        }

        Ok(series)
    }
}

fn check_delta(family: &Family, delta: f64) -> Result<()> {
    if delta.is_nan() || delta < 0.0 {
        return Err(Error::NegativeDelta {
            metric: family.fq_name.clone(),
            delta,
        });
    }
    Ok(())
}
