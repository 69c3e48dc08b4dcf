use metrics_exporter_prometheus::PrometheusBuilder;
use std::{net::SocketAddr, time::Duration};

use crate::{Error, Result};

pub const SWEEPS_TOTAL: &str = "dexscan_sweeps_total";
pub const SWEEP_ERRORS_TOTAL: &str = "dexscan_sweep_errors_total";
pub const SIGNATURES_TOTAL: &str = "dexscan_signatures_total";
pub const MISSING_TRANSACTIONS_TOTAL: &str = "dexscan_missing_transactions_total";
pub const INSTRUCTIONS_MATCHED_TOTAL: &str = "dexscan_instructions_matched_total";
pub const SWEEP_DURATION_SECONDS: &str = "dexscan_sweep_duration_seconds";
pub const LAST_SLOT: &str = "dexscan_last_slot";

/// Serves the Prometheus scrape endpoint on `addr` and installs the global recorder.
pub fn install_prometheus(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| Error::Metrics(e.to_string()))
}

pub fn record_slot(slot: u64) {
    metrics::gauge!(LAST_SLOT).set(slot as f64);
}

pub fn record_signatures(exchange: &str, count: usize) {
    metrics::counter!(SIGNATURES_TOTAL, "exchange" => exchange.to_string())
        .increment(count as u64);
}

pub fn record_missing_transaction(exchange: &str) {
    metrics::counter!(MISSING_TRANSACTIONS_TOTAL, "exchange" => exchange.to_string())
        .increment(1);
}

pub fn record_instruction_matched(exchange: &str) {
    metrics::counter!(INSTRUCTIONS_MATCHED_TOTAL, "exchange" => exchange.to_string())
        .increment(1);
}

pub fn record_sweep(elapsed: Duration, failed: bool) {
    metrics::counter!(SWEEPS_TOTAL).increment(1);
    if failed {
        metrics::counter!(SWEEP_ERRORS_TOTAL).increment(1);
    }
    metrics::histogram!(SWEEP_DURATION_SECONDS).record(elapsed.as_secs_f64());
}
