use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;

/// Cooperative shutdown signal shared between the runtime and a Ctrl-C
/// watcher task. Cloning hands out another handle to the same signal.
#[derive(Clone)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Spawn the Ctrl-C watcher and install a panic hook that logs before
    /// the default hook runs. Returns a handle for the runtime to poll.
    pub fn install(self) -> Self {
        let handle = self.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown requested via Ctrl-C");
                handle.request();
            }
        });

        let original_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            tracing::error!("PANIC: {}", panic_info);
            original_panic(panic_info);
        }));

        self
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        if self.is_requested() {
            return;
        }
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_unblocks_waiters() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();
        let task = tokio::spawn(async move { waiter.wait().await });
        signal.request();
        task.await.unwrap();
        assert!(signal.is_requested());
    }

    #[tokio::test]
    async fn wait_after_request_returns_immediately() {
        let signal = ShutdownSignal::new();
        signal.request();
        signal.wait().await;
    }
}
