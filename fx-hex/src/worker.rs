use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{info, instrument, warn};

use fx_types::KeyValueStore;

use crate::RateStore;

/// Shortest period the timer accepts.
const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Longest period the timer accepts. Longer intervals would overflow
/// `Instant` arithmetic.
pub const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Periodically refreshes a [`RateStore`] in the background.
pub struct RefreshWorker<S: KeyValueStore> {
    store: Arc<RateStore<S>>,
}

impl<S: KeyValueStore> RefreshWorker<S> {
    pub fn new(store: Arc<RateStore<S>>) -> Self {
        Self { store }
    }

    /// Starts the timer task. Keep the handle to stop it on shutdown.
    pub fn spawn(self) -> RefreshHandle {
        let (shutdown, rx) = watch::channel(false);
        let join = tokio::spawn(self.run(rx));
        RefreshHandle { shutdown, join }
    }

    #[instrument(skip_all)]
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let period = self.store.refresh_interval().clamp(MIN_PERIOD, MAX_PERIOD);
        let now = Instant::now();
        // Stale rates (fallback table, expired cache) are refreshed right away.
        let start = if self.store.is_stale() {
            now
        } else {
            now.checked_add(period).unwrap_or(now)
        };

        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Starting rate refresh worker every {:?}", period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.store.refresh().await {
                        warn!("Scheduled refresh failed, retrying in {:?}", period);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Rate refresh worker stopped");
    }
}

/// Handle to a running [`RefreshWorker`].
pub struct RefreshHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stops the timer and waits for the task to exit.
    ///
    /// A refresh already in progress finishes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            warn!("Rate refresh worker ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
