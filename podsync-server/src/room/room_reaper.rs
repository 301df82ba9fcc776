use crate::config::ReaperConfig;
use crate::room::RoomStore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Background sweep that evicts rooms left empty past the retention window.
///
/// Normal leaves delete empty rooms synchronously; this only catches rooms
/// that were created but never joined, or that a crash path left behind.
pub struct RoomReaper {
    store: RoomStore,
    config: ReaperConfig,
}

impl RoomReaper {
    pub fn new(store: RoomStore, config: ReaperConfig) -> Self {
        Self { store, config }
    }

    /// Runs one sweep and returns how many rooms were evicted.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let retention = self.config.retention;

        let candidates = self.store.list_rooms().into_iter().filter(|summary| {
            summary.participant_count == 0
                && now.saturating_duration_since(summary.created_at) > retention
        });

        let mut evicted = 0;
        for summary in candidates {
            // The snapshot may be stale; the store re-checks under the lock.
            if self.store.delete_if_idle(&summary.id, now, retention) {
                info!("Cleaned up empty room: {}", summary.id);
                evicted += 1;
            }
        }
        evicted
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        info!(
            "Room reaper started (interval {:?}, retention {:?})",
            self.config.sweep_interval, self.config.retention
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = self.sweep();
                    debug!("Reaper sweep evicted {} room(s)", evicted);
                }
            }
        }

        info!("Room reaper stopped");
    }
}
