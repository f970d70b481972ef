use ahash::AHashMap;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Request latency histogram recorded by the metrics middleware.
pub const API_REQUEST_DURATION: &str = "api_request_duration_seconds";
/// Request counter recorded by the metrics middleware.
pub const API_REQUESTS_TOTAL: &str = "api_requests_total";
/// Simulated backend delay applied to `/api` responses.
pub const MOCK_LATENCY_DURATION: &str = "mock_latency_seconds";

// A panicking writer cannot leave these maps half-updated (every value is an
// atomic), so a poisoned lock is still safe to use.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Apply `update` to the series under `key`, registering it with `init` first
/// when it does not exist yet. Existing series only take the read lock.
fn upsert<K, Q, V>(lock: &RwLock<AHashMap<K, V>>, key: &Q, init: impl FnOnce() -> V, update: impl FnOnce(&V))
where
    K: Borrow<Q> + Hash + Eq,
    Q: ToOwned<Owned = K> + Hash + Eq + ?Sized,
{
    if let Some(series) = read(lock).get(key) {
        update(series);
        return;
    }
    let mut map = write(lock);
    update(map.entry(key.to_owned()).or_insert_with(init));
}

fn add_f64(cell: &AtomicU64, value: f64) {
    let mut current = cell.load(Ordering::Relaxed);
    loop {
        let next = (f64::from_bits(current) + value).to_bits();
        match cell.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break,
            Err(actual) => current = actual,
        }
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Distribution of observed values over fixed upper bounds.
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<f64>,
    counts: Vec<AtomicU64>,
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new(buckets: Vec<f64>) -> Self {
        let counts = buckets.iter().map(|_| AtomicU64::new(0)).collect();
        Self {
            buckets,
            counts,
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, value: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        add_f64(&self.sum, value);
        // Only the first bucket that fits is bumped; exports accumulate.
        if let Some(i) = self.buckets.iter().position(|b| value <= *b) {
            self.counts[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn sum(&self) -> f64 {
        f64::from_bits(self.sum.load(Ordering::Relaxed))
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// `(upper_bound, cumulative_count)` pairs in ascending order.
    pub fn cumulative(&self) -> Vec<(f64, u64)> {
        let mut running = 0;
        self.buckets
            .iter()
            .zip(&self.counts)
            .map(|(b, c)| {
                running += c.load(Ordering::Relaxed);
                (*b, running)
            })
            .collect()
    }
}

/// HTTP duration buckets in seconds.
fn default_duration_buckets() -> Vec<f64> {
    vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Sorted `key=value` pairs distinguishing series within one counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Labels(Vec<(String, String)>);

impl Labels {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let mut v: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        v.sort_by(|a, b| a.0.cmp(&b.0));
        Self(v)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `{key="value",key2="value2"}`, or empty when there are no labels.
    pub fn prometheus_str(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let inner: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, v.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect();
        format!("{{{}}}", inner.join(","))
    }
}

// ---------------------------------------------------------------------------
// MetricsCollector
// ---------------------------------------------------------------------------

/// Process-wide counters, gauges and histograms.
///
/// Series are registered lazily under a write lock; updates to existing
/// series take only the read lock and an atomic add.
#[derive(Debug)]
pub struct MetricsCollector {
    counters: RwLock<AHashMap<(String, Labels), AtomicU64>>,
    gauges: RwLock<AHashMap<String, AtomicI64>>,
    histograms: RwLock<AHashMap<String, Histogram>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(AHashMap::new()),
            gauges: RwLock::new(AHashMap::new()),
            histograms: RwLock::new(AHashMap::new()),
        }
    }

    /// Collector with the request and mock-latency histograms registered.
    pub fn with_defaults() -> Self {
        let collector = Self::new();
        {
            let mut h = write(&collector.histograms);
            for name in [API_REQUEST_DURATION, MOCK_LATENCY_DURATION] {
                h.insert(name.to_string(), Histogram::new(default_duration_buckets()));
            }
        }
        collector
    }

    // -- Counters -----------------------------------------------------------

    pub fn increment_counter(&self, name: &str, labels: &[(&str, &str)]) {
        self.increment_counter_by(name, labels, 1);
    }

    pub fn increment_counter_by(&self, name: &str, labels: &[(&str, &str)], amount: u64) {
        let key = (name.to_string(), Labels::new(labels));
        upsert(&self.counters, &key, || AtomicU64::new(0), |c| {
            c.fetch_add(amount, Ordering::Relaxed);
        });
    }

    pub fn get_counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        let key = (name.to_string(), Labels::new(labels));
        read(&self.counters)
            .get(&key)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Sum of a counter across all of its label sets.
    pub fn counter_total(&self, name: &str) -> u64 {
        read(&self.counters)
            .iter()
            .filter(|((n, _), _)| n == name)
            .map(|(_, c)| c.load(Ordering::Relaxed))
            .sum()
    }

    // -- Gauges -------------------------------------------------------------

    pub fn set_gauge(&self, name: &str, value: i64) {
        upsert(&self.gauges, name, || AtomicI64::new(0), |g| g.store(value, Ordering::Relaxed));
    }

    pub fn get_gauge(&self, name: &str) -> i64 {
        read(&self.gauges)
            .get(name)
            .map_or(0, |g| g.load(Ordering::Relaxed))
    }

    // -- Histograms ---------------------------------------------------------

    /// Record into `name`, creating it with duration buckets on first use.
    pub fn record_histogram(&self, name: &str, value: f64) {
        upsert(
            &self.histograms,
            name,
            || Histogram::new(default_duration_buckets()),
            |h| h.observe(value),
        );
    }

    /// `(count, sum)` for a histogram, or `None` if it was never registered.
    pub fn histogram_snapshot(&self, name: &str) -> Option<(u64, f64)> {
        read(&self.histograms).get(name).map(|h| (h.count(), h.sum()))
    }

    // -- Export --------------------------------------------------------------

    /// Prometheus text exposition format, series sorted by name.
    pub fn export_prometheus(&self) -> String {
        let mut out = String::new();

        {
            let map = read(&self.counters);
            let mut series: Vec<(&str, &Labels, u64)> = map
                .iter()
                .map(|((name, labels), v)| (name.as_str(), labels, v.load(Ordering::Relaxed)))
                .collect();
            series.sort_by(|a, b| {
                a.0.cmp(b.0)
                    .then_with(|| a.1.prometheus_str().cmp(&b.1.prometheus_str()))
            });
            let mut last: Option<&str> = None;
            for (name, labels, value) in series {
                if last != Some(name) {
                    out.push_str(&format!("# TYPE {name} counter\n"));
                    last = Some(name);
                }
                out.push_str(&format!("{name}{} {value}\n", labels.prometheus_str()));
            }
        }

        {
            let map = read(&self.gauges);
            let mut names: Vec<&String> = map.keys().collect();
            names.sort();
            for name in names {
                let val = map[name].load(Ordering::Relaxed);
                out.push_str(&format!("# TYPE {name} gauge\n{name} {val}\n"));
            }
        }

        {
            let map = read(&self.histograms);
            let mut names: Vec<&String> = map.keys().collect();
            names.sort();
            for name in names {
                let h = &map[name];
                out.push_str(&format!("# TYPE {name} histogram\n"));
                for (bound, cumulative) in h.cumulative() {
                    out.push_str(&format!("{name}_bucket{{le=\"{bound}\"}} {cumulative}\n"));
                }
                out.push_str(&format!("{name}_bucket{{le=\"+Inf\"}} {}\n", h.count()));
                out.push_str(&format!("{name}_sum {}\n", h.sum()));
                out.push_str(&format!("{name}_count {}\n", h.count()));
            }
        }

        out
    }

    pub fn export_json(&self) -> serde_json::Value {
        let counters: serde_json::Map<String, serde_json::Value> = read(&self.counters)
            .iter()
            .map(|((name, labels), val)| {
                (
                    format!("{name}{}", labels.prometheus_str()),
                    serde_json::json!(val.load(Ordering::Relaxed)),
                )
            })
            .collect();

        let gauges: serde_json::Map<String, serde_json::Value> = read(&self.gauges)
            .iter()
            .map(|(name, val)| (name.clone(), serde_json::json!(val.load(Ordering::Relaxed))))
            .collect();

        let histograms: serde_json::Map<String, serde_json::Value> = read(&self.histograms)
            .iter()
            .map(|(name, h)| {
                let buckets: Vec<serde_json::Value> = h
                    .cumulative()
                    .into_iter()
                    .map(|(le, count)| serde_json::json!({ "le": le, "count": count }))
                    .collect();
                (
                    name.clone(),
                    serde_json::json!({
                        "buckets": buckets,
                        "sum": h.sum(),
                        "count": h.count(),
                    }),
                )
            })
            .collect();

        serde_json::json!({
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// The process-wide collector, created with defaults on first use.
pub fn global_metrics() -> &'static MetricsCollector {
    use std::sync::OnceLock;
    static INSTANCE: OnceLock<MetricsCollector> = OnceLock::new();
    INSTANCE.get_or_init(MetricsCollector::with_defaults)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_per_label_set() {
        let m = MetricsCollector::new();
        m.increment_counter("stage_transitions_total", &[("to", "approved")]);
        m.increment_counter("stage_transitions_total", &[("to", "approved")]);
        m.increment_counter("stage_transitions_total", &[("to", "paid")]);

        assert_eq!(m.get_counter("stage_transitions_total", &[("to", "approved")]), 2);
        assert_eq!(m.get_counter("stage_transitions_total", &[("to", "paid")]), 1);
        assert_eq!(m.get_counter("stage_transitions_total", &[("to", "received")]), 0);
        assert_eq!(m.counter_total("stage_transitions_total"), 3);
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let h = Histogram::new(vec![0.1, 1.0]);
        h.observe(0.05);
        h.observe(0.5);
        h.observe(5.0);
        assert_eq!(h.cumulative(), vec![(0.1, 1), (1.0, 2)]);
        assert_eq!(h.count(), 3);
        assert!((h.sum() - 5.55).abs() < 1e-9);
    }

    #[test]
    fn defaults_register_histograms() {
        let m = MetricsCollector::with_defaults();
        assert_eq!(m.histogram_snapshot(API_REQUEST_DURATION), Some((0, 0.0)));
        assert_eq!(m.histogram_snapshot(MOCK_LATENCY_DURATION), Some((0, 0.0)));
        assert!(MetricsCollector::new().histogram_snapshot(API_REQUEST_DURATION).is_none());
    }

    #[test]
    fn prometheus_export() {
        let m = MetricsCollector::new();
        m.increment_counter(API_REQUESTS_TOTAL, &[("status", "200"), ("method", "GET")]);
        m.set_gauge("dataset_invoices", 100);
        m.record_histogram(API_REQUEST_DURATION, 0.1);

        let output = m.export_prometheus();
        assert!(output.contains("# TYPE api_requests_total counter"));
        assert!(output.contains("api_requests_total{method=\"GET\",status=\"200\"} 1"));
        assert!(output.contains("dataset_invoices 100"));
        assert!(output.contains("api_request_duration_seconds_bucket{le=\"0.1\"} 1"));
        assert!(output.contains("api_request_duration_seconds_count 1"));
    }

    #[test]
    fn label_values_are_escaped() {
        let l = Labels::new(&[("path", "a\"b")]);
        assert_eq!(l.prometheus_str(), "{path=\"a\\\"b\"}");
        assert_eq!(Labels::empty().prometheus_str(), "");
    }

    #[test]
    fn json_export() {
        let m = MetricsCollector::new();
        m.set_gauge("dataset_customers", 4);
        m.increment_counter("logins_total", &[]);
        let json = m.export_json();
        assert_eq!(json["gauges"]["dataset_customers"], 4);
        assert_eq!(json["counters"]["logins_total"], 1);
    }

    #[test]
    fn global_metrics_singleton() {
        assert!(std::ptr::eq(global_metrics(), global_metrics()));
    }
}
