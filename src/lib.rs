//! Countdown - a countdown timer state machine served over HTTP
//! 
//! A countdown moves Setup -> Running(n) -> ... -> Running(0) -> Finished,
//! one step per tick. This library provides the state machine, the driver
//! that owns the single active tick task, and an HTTP surface through which
//! a front end can start, restart and observe it.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, CountDownState};
pub use tasks::CountDownDriver;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
