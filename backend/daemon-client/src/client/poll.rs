//! Poll loop driving the state machine.
//!
//! One loop per client at most. The loop holds only a weak reference to the
//! client, so dropping the last handle ends it.

use crate::client::{ClientInner, DaemonClient};

use models::ClientState;

use std::sync::{Arc, PoisonError, Weak};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_SYNC_EVERY: u32 = 15;

/// Poll loop cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between two probes.
    pub interval: Duration,
    /// Reconcile the pool on every Nth tick spent `Usable`, starting with the first.
    pub sync_every: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            sync_every: DEFAULT_SYNC_EVERY,
        }
    }
}

impl DaemonClient {
    /// Start the poll loop, cancelling any loop already running.
    ///
    /// [`connect`](Self::connect) calls this; calling it directly resumes
    /// polling without a new handshake. Must be called from within a Tokio
    /// runtime.
    pub fn start_polling(&self) {
        let client = Arc::downgrade(&self.inner);
        let settings = self.inner.poll_settings;

        let mut poller = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = poller.take() {
            previous.abort();
            debug!("Cancelled previous poll loop");
        }
        *poller = Some(tokio::spawn(poll_loop(client, settings)));
        debug!(
            "Poll loop started: every {:?}, sync every {} usable tick(s)",
            settings.interval, settings.sync_every
        );
    }

    /// Stop the poll loop. Returns `true` if a running loop was cancelled.
    pub fn stop_polling(&self) -> bool {
        let mut poller = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match poller.take() {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                was_running
            }
            None => false,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// One poll tick. Returns `false` when the loop must stop.
    async fn tick(&self, usable_ticks: &mut u32, sync_every: u32) -> bool {
        if let Err(error) = self.check().await {
            debug!("Poll probe: {error}");
        }

        match self.state().await {
            ClientState::Invalid => {
                warn!("Daemon scope is invalid, poll loop stopped; connect again to resume");
                false
            }
            ClientState::Pending => true,
            ClientState::Usable => {
                if *usable_ticks % sync_every == 0
                    && let Err(error) = self.sync().await
                {
                    warn!("Pool sync failed, poll loop stopped: {error}");
                    self.transition(ClientState::Invalid).await;
                    return false;
                }
                *usable_ticks = (*usable_ticks + 1) % sync_every;
                true
            }
        }
    }
}

async fn poll_loop(client: Weak<ClientInner>, settings: PollSettings) {
    let interval = settings.interval.max(Duration::from_millis(1));
    let sync_every = settings.sync_every.max(1);

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut usable_ticks = 0;

    loop {
        ticker.tick().await;

        let Some(inner) = client.upgrade() else {
            debug!("Daemon client dropped, poll loop exiting");
            return;
        };
        let handle = DaemonClient::from_inner(inner);

        if !handle.tick(&mut usable_ticks, sync_every).await {
            return;
        }
    }
}
