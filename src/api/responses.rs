//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::CountDownState;

/// Body of `POST /start`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub initial: u32,
}

/// API response structure for start and restart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub countdown: CountDownState,
    pub initial_count: u32,
}

impl ApiResponse {
    pub fn new(message: String, countdown: CountDownState, initial_count: u32) -> Self {
        Self {
            status: status_label(&countdown).to_string(),
            message,
            timestamp: Utc::now(),
            countdown,
            initial_count,
        }
    }
}

/// Point-in-time view of the countdown, also pushed on `/events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountDownSnapshot {
    pub countdown: CountDownState,
    pub key: String,
    pub initial_count: u32,
}

impl CountDownSnapshot {
    pub fn new(countdown: CountDownState, initial_count: u32) -> Self {
        Self {
            key: countdown.key(),
            countdown,
            initial_count,
        }
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: CountDownSnapshot,
    pub tick_period_ms: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

fn status_label(countdown: &CountDownState) -> &'static str {
    match countdown {
        CountDownState::Setup => "setup",
        CountDownState::Running(_) => "running",
        CountDownState::Finished => "finished",
    }
}
