// src/metrics/collector.rs
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Instant;
use anyhow::Result;

use crate::prediction::{Outcome, PredictionError};

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // Request metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,

    // Prediction metrics
    pub predictions_total: IntCounterVec,
    pub prediction_errors_total: IntCounterVec,

    // Model state
    pub model_loaded: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let http_requests_total = IntCounterVec::new(
            Opts::new("diabetes_http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "diabetes_http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "route"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let predictions_total = IntCounterVec::new(
            Opts::new("diabetes_predictions_total", "Predictions served, by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_errors_total = IntCounterVec::new(
            Opts::new(
                "diabetes_prediction_errors_total",
                "Rejected or failed predictions, by error kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(prediction_errors_total.clone()))?;

        let model_loaded = IntGauge::new(
            "diabetes_model_loaded",
            "Classifier availability (1=loaded, 0=unavailable)",
        )?;
        registry.register(Box::new(model_loaded.clone()))?;

        Ok(Self {
            http_requests_total,
            http_request_duration_seconds,
            predictions_total,
            prediction_errors_total,
            model_loaded,
        })
    }

    pub fn record_request(
        &self,
        method: &str,
        route: &str,
        status_code: u16,
        duration: std::time::Duration,
    ) {
        let status = status_code.to_string();
        self.http_requests_total
            .with_label_values(&[method, route, &status])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration.as_secs_f64());
    }

    pub fn record_prediction(&self, result: &Result<Outcome, PredictionError>) {
        match result {
            Ok(outcome) => self
                .predictions_total
                .with_label_values(&[outcome.as_str()])
                .inc(),
            Err(e) => self
                .prediction_errors_total
                .with_label_values(&[e.kind()])
                .inc(),
        }
    }

    pub fn set_model_loaded(&self, loaded: bool) {
        self.model_loaded.set(if loaded { 1 } else { 0 });
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
