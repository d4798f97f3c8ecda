//! Resumable pause gate shared between the driver task and the audio sink

use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Raised when the session token fires while a delay or gate wait is parked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Pause/resume gate backed by a watch channel. Pausing parks every waiter
/// without polling; resuming wakes them all at once.
#[derive(Debug)]
pub struct PauseGate {
    tx: watch::Sender<bool>,
}

impl PauseGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn pause(&self) {
        self.tx.send_replace(true);
    }

    pub fn resume(&self) {
        self.tx.send_replace(false);
    }

    /// Receiver for threads that cannot await, such as the blocking sink.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Parks until the gate is open. Returns immediately when not paused.
    pub async fn wait_until_resumed(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        let mut rx = self.tx.subscribe();
        loop {
            if !*rx.borrow_and_update() {
                return Ok(());
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(Cancelled),
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Err(Cancelled);
                    }
                }
            }
        }
    }

    /// Resolves the next time the gate closes. Used to freeze a running
    /// delay without losing the remaining time.
    async fn until_paused(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender dropped; never resolves again.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleeps for `duration` of unpaused time. Pausing stops the clock and
    /// resuming continues from the remainder, so the total scheduled length
    /// is preserved exactly.
    pub async fn pausable_delay(
        &self,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        let mut remaining = duration;
        loop {
            self.wait_until_resumed(cancel).await?;
            let started = tokio::time::Instant::now();
            tokio::select! {
                _ = cancel.cancelled() => return Err(Cancelled),
                _ = tokio::time::sleep(remaining) => return Ok(()),
                _ = self.until_paused() => {
                    remaining = remaining.saturating_sub(started.elapsed());
                }
            }
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}
