//! Countdown observer background task

use tracing::{debug, info};

use super::CountDownDriver;

/// Log every state and initial-count change published by `driver`.
///
/// Runs until the driver is dropped.
pub async fn state_observer_task(driver: CountDownDriver) {
    info!("Starting countdown observer task");

    let mut state_rx = driver.subscribe_state();
    let mut initial_rx = driver.subscribe_initial_count();
    drop(driver);

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *state_rx.borrow_and_update();
                info!("Countdown state: {}", state);
            }
            changed = initial_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let initial = *initial_rx.borrow_and_update();
                debug!("Initial count set to {}", initial);
            }
        }
    }

    debug!("Countdown observer stopped");
}
