//! Request and resolution counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use currex_fx::Provenance;
use serde::Serialize;

/// Server metrics.
pub struct Metrics {
    started_at: DateTime<Utc>,
    /// Exchange requests received.
    pub exchanges_total: AtomicU64,
    /// Exchanges answered with no available rate.
    pub exchanges_no_rate: AtomicU64,
    /// Exchanges rejected for any other reason.
    pub exchanges_failed: AtomicU64,
    /// Resolutions by direct edge.
    pub resolved_direct: AtomicU64,
    /// Resolutions by inverted reverse edge.
    pub resolved_inverse: AtomicU64,
    /// Resolutions through the reference currency.
    pub resolved_bridged: AtomicU64,
    /// Self-conversions.
    pub resolved_identity: AtomicU64,
    /// Currencies registered through the API.
    pub currencies_created: AtomicU64,
    /// Rates created or updated through the API.
    pub rates_written: AtomicU64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            exchanges_total: AtomicU64::new(0),
            exchanges_no_rate: AtomicU64::new(0),
            exchanges_failed: AtomicU64::new(0),
            resolved_direct: AtomicU64::new(0),
            resolved_inverse: AtomicU64::new(0),
            resolved_bridged: AtomicU64::new(0),
            resolved_identity: AtomicU64::new(0),
            currencies_created: AtomicU64::new(0),
            rates_written: AtomicU64::new(0),
        }
    }

    /// Increment exchange requests.
    pub fn exchange_requested(&self) {
        self.exchanges_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how a successful exchange was priced.
    pub fn exchange_resolved(&self, provenance: Provenance) {
        let counter = match provenance {
            Provenance::Direct => &self.resolved_direct,
            Provenance::Inverse => &self.resolved_inverse,
            Provenance::Bridged(_) => &self.resolved_bridged,
            Provenance::Identity => &self.resolved_identity,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an exchange with no rate path.
    pub fn exchange_no_rate(&self) {
        self.exchanges_no_rate.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected exchange.
    pub fn exchange_failed(&self) {
        self.exchanges_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment currencies created.
    pub fn currency_created(&self) {
        self.currencies_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment rates written.
    pub fn rate_written(&self) {
        self.rates_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: self.started_at,
            uptime_seconds: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
            exchanges_total: self.exchanges_total.load(Ordering::Relaxed),
            exchanges_no_rate: self.exchanges_no_rate.load(Ordering::Relaxed),
            exchanges_failed: self.exchanges_failed.load(Ordering::Relaxed),
            resolved_direct: self.resolved_direct.load(Ordering::Relaxed),
            resolved_inverse: self.resolved_inverse.load(Ordering::Relaxed),
            resolved_bridged: self.resolved_bridged.load(Ordering::Relaxed),
            resolved_identity: self.resolved_identity.load(Ordering::Relaxed),
            currencies_created: self.currencies_created.load(Ordering::Relaxed),
            rates_written: self.rates_written.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"# HELP currex_exchanges_total Total exchange requests
# TYPE currex_exchanges_total counter
currex_exchanges_total {}

# HELP currex_exchanges_no_rate Exchanges with no rate path
# TYPE currex_exchanges_no_rate counter
currex_exchanges_no_rate {}

# HELP currex_exchanges_failed Exchanges rejected for other reasons
# TYPE currex_exchanges_failed counter
currex_exchanges_failed {}

# HELP currex_resolutions_total Successful resolutions by provenance
# TYPE currex_resolutions_total counter
currex_resolutions_total{{provenance="direct"}} {}
currex_resolutions_total{{provenance="inverse"}} {}
currex_resolutions_total{{provenance="bridged"}} {}
currex_resolutions_total{{provenance="identity"}} {}

# HELP currex_currencies_created Currencies registered
# TYPE currex_currencies_created counter
currex_currencies_created {}

# HELP currex_rates_written Rates created or updated
# TYPE currex_rates_written counter
currex_rates_written {}

# HELP currex_uptime_seconds Seconds since start
# TYPE currex_uptime_seconds gauge
currex_uptime_seconds {}
"#,
            snapshot.exchanges_total,
            snapshot.exchanges_no_rate,
            snapshot.exchanges_failed,
            snapshot.resolved_direct,
            snapshot.resolved_inverse,
            snapshot.resolved_bridged,
            snapshot.resolved_identity,
            snapshot.currencies_created,
            snapshot.rates_written,
            snapshot.uptime_seconds,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub exchanges_total: u64,
    pub exchanges_no_rate: u64,
    pub exchanges_failed: u64,
    pub resolved_direct: u64,
    pub resolved_inverse: u64,
    pub resolved_bridged: u64,
    pub resolved_identity: u64,
    pub currencies_created: u64,
    pub rates_written: u64,
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<Metrics>;

#[cfg(test)]
mod tests {
    use super::*;
    use currex_fx::BridgeRoute;

    #[test]
    fn test_metrics_increment() {
        let metrics = Metrics::new();

        metrics.exchange_requested();
        metrics.exchange_requested();
        metrics.exchange_resolved(Provenance::Bridged(BridgeRoute::Through));
        metrics.exchange_no_rate();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.exchanges_total, 2);
        assert_eq!(snapshot.resolved_bridged, 1);
        assert_eq!(snapshot.resolved_direct, 0);
        assert_eq!(snapshot.exchanges_no_rate, 1);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.exchange_requested();
        metrics.exchange_resolved(Provenance::Inverse);

        let output = metrics.to_prometheus();
        assert!(output.contains("currex_exchanges_total 1"));
        assert!(output.contains("currex_resolutions_total{provenance=\"inverse\"} 1"));
    }
}
