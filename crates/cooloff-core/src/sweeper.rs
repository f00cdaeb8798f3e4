//! Background lifecycle sweeper.
//!
//! Runs `refresh_lifecycle` on an interval until cancelled. Cancellation is
//! cooperative: the loop only ever stops between sweeps, so a sweep's store
//! transactions are never abandoned mid-flight.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::repo::IntentRepository;

/// Periodic lifecycle refresh with cooperative cancellation.
pub struct Sweeper {
    repo: Arc<Mutex<IntentRepository>>,
    interval: Duration,
}

/// Create a cancellation pair for [`Sweeper::run`]. Send `true` to stop.
pub fn cancellation() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

impl Sweeper {
    pub fn new(repo: Arc<Mutex<IntentRepository>>, interval: Duration) -> Self {
        Self { repo, interval }
    }

    /// Sweep until the cancel channel flips to `true` or its sender drops.
    pub async fn run(self, mut cancel: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let result = {
                        let repo = self.repo.lock().unwrap_or_else(PoisonError::into_inner);
                        repo.refresh_lifecycle()
                    };
                    match result {
                        Ok(0) => {}
                        Ok(transitioned) => {
                            debug!(transitioned, "lifecycle sweep moved intents to checkpoint");
                        }
                        Err(e) => warn!(error = %e, "lifecycle sweep failed"),
                    }
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
