//! Main application state management

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tracing::info;

use super::CountDownState;
use crate::tasks::CountDownDriver;

/// Shared state handed to every HTTP handler
#[derive(Debug)]
pub struct AppState {
    /// The countdown and its tick task
    pub driver: CountDownDriver,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(port: u16, host: String, tick_period: Duration) -> Self {
        Self {
            driver: CountDownDriver::new(tick_period),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Start a countdown from `initial` and record the action
    pub fn start_countdown(&self, initial: u32) -> Result<CountDownState, String> {
        info!("Start requested with initial count {}", initial);
        let state = self.driver.start(initial)?;
        self.record_action(format!("start({})", initial));
        Ok(state)
    }

    /// Reset the countdown to setup and record the action
    pub fn restart_countdown(&self) -> Result<CountDownState, String> {
        info!("Restart requested");
        let state = self.driver.restart()?;
        self.record_action("restart".to_string());
        Ok(state)
    }

    fn record_action(&self, action: String) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action);
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

fn format_uptime(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    let minutes = (duration.as_secs() % 3600) / 60;
    let seconds = duration.as_secs() % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(42)), "42s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3 * 3600 + 61)), "3h 1m 1s");
    }

    #[tokio::test(start_paused = true)]
    async fn actions_are_tracked() {
        let state = AppState::new(0, "127.0.0.1".to_string(), Duration::from_secs(1));
        assert_eq!(state.get_last_action(), (None, None));

        assert_eq!(state.start_countdown(4).unwrap(), CountDownState::Running(4));
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("start(4)"));
        assert!(time.is_some());

        assert_eq!(state.restart_countdown().unwrap(), CountDownState::Setup);
        assert_eq!(state.get_last_action().0.as_deref(), Some("restart"));
        assert_eq!(state.driver.state(), CountDownState::Setup);
    }
}
