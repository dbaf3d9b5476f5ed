//! Prometheus metrics for the counter and report pipeline.
//!
//! All series are registered against a process-global recorder installed once
//! at startup. Counters cover the vote/reset protocol and report emission;
//! gauges expose the agreed count and witness table size so dashboards can
//! graph the counter directly.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn try_init_prometheus_recorder(
) -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Installs the global Prometheus recorder, once.
///
/// If installation fails (another recorder already claimed the global slot),
/// falls back to an unregistered recorder so callers still get a working
/// handle instead of a panic.
pub fn init_prometheus_recorder() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            match try_init_prometheus_recorder() {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Failed to install primary Prometheus recorder, attempting fallback"
                    );

                    let recorder = PrometheusBuilder::new().build_recorder();
                    tracing::warn!(
                        "Using fallback Prometheus recorder (install error: {e}) - metrics may not be globally visible"
                    );
                    recorder.handle()
                }
            }
        })
        .clone()
}

/// Renders the current metric registry in Prometheus exposition format.
/// Returns an empty string if the recorder was never installed.
#[must_use]
pub fn render() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record an accepted vote.
pub fn record_vote(advanced: bool) {
    counter!("joke_votes_total").increment(1);
    if advanced {
        counter!("joke_quorum_advances_total").increment(1);
    }
}

/// Record a vote rejected by the witness table bound.
pub fn record_vote_rejected() {
    counter!("joke_votes_rejected_total").increment(1);
}

/// Record a reset request.
pub fn record_reset(reset_all: bool) {
    counter!("joke_resets_total").increment(1);
    if reset_all {
        counter!("joke_quorum_resets_total").increment(1);
    }
}

/// Record a report successfully handed to its sink.
pub fn record_report(kind: &'static str) {
    counter!("joke_reports_emitted_total", "kind" => kind).increment(1);
}

/// Record a report that could not be persisted.
pub fn record_report_persist_failure() {
    counter!("joke_report_persist_failures_total").increment(1);
}

/// Publish the counter's current shape.
pub fn set_counter_gauges(agreed_count: u64, witnesses: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("joke_agreed_count").set(agreed_count as f64);
    #[allow(clippy::cast_precision_loss)]
    gauge!("joke_witnesses").set(witnesses as f64);
}
