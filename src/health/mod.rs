// src/health/mod.rs
//! Liveness reporting. A running process is always healthy; model state is informational.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub model_loaded: bool,
    pub started_at: String,
    pub uptime_secs: i64,
}

impl HealthReport {
    pub fn new(model_loaded: bool, started_at: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            model_loaded,
            started_at: started_at.to_rfc3339(),
            uptime_secs: (Utc::now() - started_at).num_seconds().max(0),
        }
    }
}
