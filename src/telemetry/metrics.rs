//! Prometheus metrics

use crate::market::TickType;
use std::net::SocketAddr;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Completed firings
    Firings,
    /// Firings skipped because another was still running
    SkippedFirings,
    /// Per-symbol failures inside a firing
    SymbolErrors,
    /// Firings that panicked
    FiringPanics,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Symbols with at least one subscription
    ActiveSymbols,
    /// Symbols holding walk state
    TrackedSymbols,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::Firings => "synthfeed_firings_total",
            CounterMetric::SkippedFirings => "synthfeed_firings_skipped_total",
            CounterMetric::SymbolErrors => "synthfeed_symbol_errors_total",
            CounterMetric::FiringPanics => "synthfeed_firing_panics_total",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::ActiveSymbols => "synthfeed_active_symbols",
            GaugeMetric::TrackedSymbols => "synthfeed_tracked_symbols",
        }
    }
}

/// Increment a counter
pub fn increment(metric: CounterMetric, value: u64) {
    metrics::counter!(metric.name()).increment(value);
}

/// Count emitted ticks of one kind
pub fn record_ticks(kind: TickType, count: u64) {
    let label = match kind {
        TickType::Trade => "trade",
        TickType::Quote => "quote",
    };
    metrics::counter!("synthfeed_ticks_emitted_total", "kind" => label).increment(count);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Serve metrics for Prometheus scraping on `0.0.0.0:port`
///
/// Must be called from within a tokio runtime.
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
