use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Add `delta` to an `f64` stored as raw bits.
fn add_f64(cell: &AtomicU64, delta: f64) {
    let mut current = cell.load(Ordering::Relaxed);
    loop {
        let next = (f64::from_bits(current) + delta).to_bits();
        match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return,
            Err(actual) => current = actual,
        }
    }
}

/// A thread-safe counter series
#[derive(Debug, Clone)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Counter {
    /// Create a new counter at zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0f64.to_bits())),
        }
    }

    /// Increment the counter by a non-negative amount.
    ///
    /// Callers validate the sign; the store rejects negative deltas before
    /// they reach the series.
    pub fn inc_by(&self, delta: f64) {
        add_f64(&self.value, delta);
    }

    /// Get the current value
    #[must_use]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Acquire))
    }
}

/// A thread-safe gauge series (can go up and down)
#[derive(Debug, Clone)]
pub struct Gauge {
    value: Arc<AtomicU64>,
}

impl Default for Gauge {
    fn default() -> Self {
        Self::new()
    }
}

impl Gauge {
    /// Create a new gauge at zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0f64.to_bits())),
        }
    }

    /// Set the gauge value
    pub fn set(&self, value: f64) {
        self.value.store(value.to_bits(), Ordering::Release);
    }

    /// Add `delta` (may be negative)
    pub fn add(&self, delta: f64) {
        add_f64(&self.value, delta);
    }

    /// Get the current value
    #[must_use]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Acquire))
    }
}

/// Point-in-time view of one histogram series
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` per bucket, in bound order
    pub buckets: Vec<(f64, u64)>,
    /// Sum of all observed values
    pub sum: f64,
    /// Total number of observations
    pub count: u64,
}

#[derive(Debug)]
struct HistogramState {
    counts: Vec<u64>,
    sum: f64,
    count: u64,
}

/// A histogram series for tracking distributions.
///
/// Buckets, sum and count live behind one lock so a reader never sees an
/// observation half applied.
#[derive(Debug, Clone)]
pub struct Histogram {
    bounds: Arc<[f64]>,
    state: Arc<Mutex<HistogramState>>,
}

impl Histogram {
    /// Create a histogram over the given (sorted) upper bounds
    #[must_use]
    pub fn with_bounds(bounds: Arc<[f64]>) -> Self {
        let state = HistogramState {
            counts: vec![0; bounds.len()],
            sum: 0.0,
            count: 0,
        };
        Self {
            bounds,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Observe a value
    pub fn observe(&self, value: f64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for (bound, count) in self.bounds.iter().zip(state.counts.iter_mut()) {
            if value <= *bound {
                *count += 1;
            }
        }
        state.sum += value;
        state.count += 1;
    }

    /// Get the count of observations
    #[must_use]
    pub fn count(&self) -> u64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).count
    }

    /// Get the sum of all observations
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).sum
    }

    /// Read buckets, sum and count together
    #[must_use]
    pub fn snapshot(&self) -> HistogramSnapshot {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        HistogramSnapshot {
            buckets: self
                .bounds
                .iter()
                .copied()
                .zip(state.counts.iter().copied())
                .collect(),
            sum: state.sum,
            count: state.count,
        }
    }
}
