//! Countdown tick driver
//!
//! Owns at most one tick task at a time. Every `start` opens a new session
//! with a fresh generation number; the generation and the task handle sit
//! behind one mutex, and a tick only writes state after confirming, under
//! that mutex, that its session is still current. A superseded task can
//! therefore never publish anything, even if it wakes up before its abort
//! takes effect.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::state::CountDownState;

/// Cadence of the countdown
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct Session {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Session {
    /// Invalidate the current session and stop its task
    fn supersede(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("Cancelling tick task for session {}", self.generation);
            }
            task.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

#[derive(Debug)]
struct Shared {
    session: Mutex<Session>,
    state_tx: watch::Sender<CountDownState>,
    initial_tx: watch::Sender<u32>,
    tick_period: Duration,
}

impl Shared {
    fn lock_session(&self) -> Result<MutexGuard<'_, Session>, String> {
        self.session
            .lock()
            .map_err(|e| format!("Failed to lock countdown session: {}", e))
    }

    /// Whether `generation` is still the active session and still counting
    fn is_live(&self, generation: u64) -> bool {
        match self.lock_session() {
            Ok(session) => session.generation == generation && self.state_tx.borrow().is_running(),
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    /// Apply one tick for `generation`. Returns whether the loop should keep going.
    fn advance(&self, generation: u64) -> Result<bool, String> {
        let session = self.lock_session()?;
        if session.generation != generation {
            debug!("Dropping tick from superseded session {}", generation);
            return Ok(false);
        }

        let current = *self.state_tx.borrow();
        if !current.is_running() {
            return Ok(false);
        }

        let initial = *self.initial_tx.borrow();
        match current.next(initial) {
            Some(next) => {
                self.state_tx.send_replace(next);
                debug!("Tick: {} -> {}", current, next);
                if next.is_finished() {
                    info!("Countdown from {} finished", initial);
                }
                Ok(next.is_running())
            }
            None => Ok(false),
        }
    }
}

/// Drives a [`CountDownState`] through one countdown at a time.
///
/// Cloning yields another handle to the same driver.
#[derive(Debug, Clone)]
pub struct CountDownDriver {
    shared: Arc<Shared>,
}

impl CountDownDriver {
    /// Create a driver in `Setup` with an initial count of zero
    pub fn new(tick_period: Duration) -> Self {
        let (state_tx, _) = watch::channel(CountDownState::Setup);
        let (initial_tx, _) = watch::channel(0);

        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session::default()),
                state_tx,
                initial_tx,
                tick_period,
            }),
        }
    }

    /// Begin a countdown from `initial`, replacing any countdown in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, initial: u32) -> Result<CountDownState, String> {
        let mut session = self.shared.lock_session()?;
        let generation = session.supersede();

        let running = CountDownState::Running(initial);
        self.shared.initial_tx.send_replace(initial);
        self.shared.state_tx.send_replace(running);

        let shared = Arc::clone(&self.shared);
        session.task = Some(tokio::spawn(tick_loop(shared, generation)));

        info!("Countdown started from {} (session {})", initial, generation);
        Ok(running)
    }

    /// Return to `Setup`, cancelling any countdown in flight
    pub fn restart(&self) -> Result<CountDownState, String> {
        let mut session = self.shared.lock_session()?;
        let generation = session.supersede();
        self.shared.state_tx.send_replace(CountDownState::Setup);

        info!("Countdown reset to setup (session {})", generation);
        Ok(CountDownState::Setup)
    }

    /// Cancel any countdown in flight, leaving the published state as is
    pub fn shutdown(&self) -> Result<(), String> {
        let mut session = self.shared.lock_session()?;
        session.supersede();
        debug!("Countdown driver shut down");
        Ok(())
    }

    pub fn state(&self) -> CountDownState {
        *self.shared.state_tx.borrow()
    }

    pub fn initial_count(&self) -> u32 {
        *self.shared.initial_tx.borrow()
    }

    pub fn tick_period(&self) -> Duration {
        self.shared.tick_period
    }

    /// Receiver notified on every published state
    pub fn subscribe_state(&self) -> watch::Receiver<CountDownState> {
        self.shared.state_tx.subscribe()
    }

    /// Receiver notified whenever a countdown is started
    pub fn subscribe_initial_count(&self) -> watch::Receiver<u32> {
        self.shared.initial_tx.subscribe()
    }
}

impl Default for CountDownDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

async fn tick_loop(shared: Arc<Shared>, generation: u64) {
    let period = shared.tick_period;
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while shared.is_live(generation) {
        interval.tick().await;
        match shared.advance(generation) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                error!("Countdown tick failed: {}", e);
                break;
            }
        }
    }

    debug!("Tick loop for session {} stopped", generation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    use CountDownState::*;

    /// Collect every published state until `Finished`
    async fn record(rx: &mut watch::Receiver<CountDownState>) -> Vec<CountDownState> {
        let mut seen = vec![*rx.borrow_and_update()];
        while !seen[seen.len() - 1].is_finished() {
            rx.changed().await.unwrap();
            seen.push(*rx.borrow_and_update());
        }
        seen
    }

    #[tokio::test]
    async fn starts_in_setup() {
        let driver = CountDownDriver::default();
        assert_eq!(driver.state(), Setup);
        assert_eq!(driver.initial_count(), 0);
        assert_eq!(driver.tick_period(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_tick_then_halts() {
        let driver = CountDownDriver::default();
        let mut rx = driver.subscribe_state();
        let started = Instant::now();

        assert_eq!(driver.start(3).unwrap(), Running(3));
        assert_eq!(driver.initial_count(), 3);

        let seen = record(&mut rx).await;
        assert_eq!(seen, vec![Running(3), Running(2), Running(1), Running(0), Finished]);
        assert_eq!(started.elapsed(), Duration::from_secs(4));

        sleep(Duration::from_secs(10)).await;
        assert_eq!(driver.state(), Finished);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn honours_custom_tick_period() {
        let driver = CountDownDriver::new(Duration::from_millis(100));
        let mut rx = driver.subscribe_state();
        let started = Instant::now();

        driver.start(2).unwrap();
        let seen = record(&mut rx).await;
        assert_eq!(seen, vec![Running(2), Running(1), Running(0), Finished]);
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn new_start_supersedes_running_countdown() {
        let driver = CountDownDriver::default();
        driver.start(10).unwrap();

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(driver.state(), Running(8));

        let mut rx = driver.subscribe_state();
        let restarted = Instant::now();
        driver.start(5).unwrap();
        assert_eq!(driver.initial_count(), 5);

        let seen = record(&mut rx).await;
        assert_eq!(
            seen,
            vec![Running(5), Running(4), Running(3), Running(2), Running(1), Running(0), Finished]
        );
        assert_eq!(restarted.elapsed(), Duration::from_secs(6));

        sleep(Duration::from_secs(20)).await;
        assert_eq!(driver.state(), Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_pending_tick() {
        let driver = CountDownDriver::default();
        driver.start(3).unwrap();

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(driver.state(), Running(2));

        assert_eq!(driver.restart().unwrap(), Setup);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(driver.state(), Setup);
        assert_eq!(driver.initial_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_finish_allows_fresh_cycle() {
        let driver = CountDownDriver::default();
        let mut rx = driver.subscribe_state();

        driver.start(0).unwrap();
        assert_eq!(record(&mut rx).await, vec![Running(0), Finished]);

        driver.restart().unwrap();
        assert_eq!(driver.state(), Setup);

        driver.start(2).unwrap();
        assert_eq!(record(&mut rx).await, vec![Running(2), Running(1), Running(0), Finished]);
    }

    #[tokio::test]
    async fn restart_without_countdown_is_setup() {
        let driver = CountDownDriver::default();
        assert_eq!(driver.restart().unwrap(), Setup);
        assert_eq!(driver.state(), Setup);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_freezes_current_state() {
        let driver = CountDownDriver::default();
        driver.start(4).unwrap();

        sleep(Duration::from_millis(1500)).await;
        driver.shutdown().unwrap();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(driver.state(), Running(3));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_cannot_write() {
        let driver = CountDownDriver::default();
        driver.start(5).unwrap();
        driver.start(5).unwrap();

        // Generation 1 was superseded by generation 2
        assert!(!driver.shared.advance(1).unwrap());
        assert_eq!(driver.state(), Running(5));
        assert!(driver.shared.advance(2).unwrap());
        assert_eq!(driver.state(), Running(4));
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_one_countdown() {
        let driver = CountDownDriver::default();
        let other = driver.clone();
        driver.start(2).unwrap();
        other.restart().unwrap();

        sleep(Duration::from_secs(5)).await;
        assert_eq!(driver.state(), Setup);
    }
}
