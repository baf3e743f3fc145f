//! Background tasks module
//! 
//! This module contains the countdown driver and the tasks that run
//! alongside the HTTP server.

pub mod countdown_timer;
pub mod state_observer;

// Re-export main items
pub use countdown_timer::{CountDownDriver, DEFAULT_TICK_PERIOD};
pub use state_observer::state_observer_task;
