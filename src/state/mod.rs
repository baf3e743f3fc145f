//! State management module
//! 
//! This module contains the countdown state machine and the shared
//! application state built around it.

pub mod countdown_state;
pub mod app_state;

// Re-export main types
pub use countdown_state::CountDownState;
pub use app_state::AppState;
