//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{debug, error, info};

use crate::{state::AppState, tasks::CountDownDriver};
use super::responses::{ApiResponse, CountDownSnapshot, HealthResponse, StartRequest, StatusResponse};

/// Handle POST /start - Begin a countdown, replacing any in flight
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start_countdown(request.initial) {
        Ok(countdown) => Ok(Json(ApiResponse::new(
            format!("Countdown started from {}", request.initial),
            countdown,
            state.driver.initial_count(),
        ))),
        Err(e) => {
            error!("Failed to start countdown: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /restart - Return to setup
pub async fn restart_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.restart_countdown() {
        Ok(countdown) => Ok(Json(ApiResponse::new(
            "Countdown reset".to_string(),
            countdown,
            state.driver.initial_count(),
        ))),
        Err(e) => {
            error!("Failed to restart countdown: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current countdown and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        snapshot: snapshot(&state.driver),
        tick_period_ms: state.driver.tick_period().as_millis() as u64,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream the countdown as server-sent events
///
/// Sends the current snapshot right away, then one per published state.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    info!("Event subscriber connected");
    let state_rx = state.driver.subscribe_state();
    let initial_rx = state.driver.subscribe_initial_count();

    let events = stream::unfold(
        (state_rx, initial_rx, true),
        |(mut state_rx, initial_rx, first)| async move {
            if !first && state_rx.changed().await.is_err() {
                debug!("Countdown closed, ending event stream");
                return None;
            }
            let countdown = *state_rx.borrow_and_update();
            let initial_count = *initial_rx.borrow();
            let event = Event::default()
                .event("state")
                .json_data(CountDownSnapshot::new(countdown, initial_count));
            Some((event, (state_rx, initial_rx, false)))
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

fn snapshot(driver: &CountDownDriver) -> CountDownSnapshot {
    CountDownSnapshot::new(driver.state(), driver.initial_count())
}
