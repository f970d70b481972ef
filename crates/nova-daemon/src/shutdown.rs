use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
use std::sync::Arc;

use tokio::sync::broadcast;

/// One-shot, clonable stop signal for the API server and its helpers.
///
/// Clones share state: firing any of them wakes every [`wait`](Self::wait)
/// and every receiver from [`subscribe`](Self::subscribe).
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    notify: broadcast::Sender<()>,
    fired: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            notify: broadcast::channel(1).0,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.fired.load(SeqCst)
    }

    /// Fire the signal. Only the first call notifies.
    pub fn trigger(&self) {
        if self.fired.swap(true, SeqCst) {
            tracing::debug!("shutdown requested again, ignoring");
            return;
        }
        tracing::info!(listeners = self.notify.receiver_count(), "shutting down");
        // No receivers is fine: late waiters see the flag.
        let _ = self.notify.send(());
    }

    /// Resolve once the signal has fired, even if that happened earlier.
    pub async fn wait(&self) {
        let mut rx = self.subscribe();
        if !self.is_shutting_down() {
            let _ = rx.recv().await;
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn subscribers_are_notified_once() {
        let signal = ShutdownSignal::new();
        let mut rx = signal.subscribe();
        assert!(!signal.is_shutting_down());

        signal.trigger();
        signal.trigger();
        assert!(signal.is_shutting_down());
        assert!(rx.recv().await.is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn wait_after_trigger_returns_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .expect("already fired");
    }

    #[tokio::test]
    async fn trigger_on_a_clone_wakes_the_original() {
        let signal = ShutdownSignal::default();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.clone().trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woke")
            .unwrap();
    }
}
