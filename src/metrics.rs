// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Call once per process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metric descriptions (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fire_ticks_total", "Poll ticks by outcome.");
        describe_counter!(
            "fire_feed_errors_total",
            "Aborted ticks by error kind (config, upstream_status, transport)."
        );
        describe_counter!(
            "fire_notifications_total",
            "Push dispatch attempts by result."
        );
        describe_gauge!(
            "fire_detections_in_region",
            "In-region detections counted by the last successful tick."
        );
        describe_gauge!("fire_observed_count", "Remembered count after the last tick.");
        describe_gauge!(
            "fire_last_tick_ts",
            "Unix ts when the last tick finished."
        );
        describe_histogram!("fire_feed_parse_ms", "Feed parse time in milliseconds.");
    });
}
