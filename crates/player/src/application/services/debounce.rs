//! Single-slot delayed task scheduler.
//!
//! At most one task is pending. Scheduling a new task cancels the pending
//! one. Once the delay elapses the task runs to completion; only the waiting
//! phase can be cancelled.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Pending {
    token: CancellationToken,
    /// Set by whoever takes the task first: the timer or a canceller.
    claimed: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Pending {
    /// Stop the task if it has not started. Returns true if it was stopped.
    fn cancel(&self) -> bool {
        self.token.cancel();
        !self.claimed.swap(true, Ordering::SeqCst)
    }
}

pub struct Debouncer {
    delay: Duration,
    slot: Mutex<Option<Pending>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` after the delay unless cancelled or replaced first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let claimed = Arc::new(AtomicBool::new(false));
        let delay = self.delay;

        let handle = tokio::spawn({
            let token = token.clone();
            let claimed = claimed.clone();
            async move {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
                if claimed.swap(true, Ordering::SeqCst) {
                    return;
                }
                task.await;
            }
        });

        let pending = Pending {
            token,
            claimed,
            handle,
        };
        if let Some(previous) = self.lock_slot().replace(pending) {
            previous.cancel();
        }
    }

    /// Cancel the pending task. Returns true if a task was waiting and will
    /// now never run; false if there was none or it already started.
    pub fn cancel(&self) -> bool {
        match self.lock_slot().take() {
            Some(pending) => pending.cancel(),
            None => false,
        }
    }

    /// Cancel the pending task, or wait for it to finish if it already
    /// started. Returns true if a waiting task was cancelled.
    pub async fn settle(&self) -> bool {
        let pending = self.lock_slot().take();
        match pending {
            Some(pending) if pending.cancel() => true,
            Some(pending) => {
                if let Err(e) = pending.handle.await {
                    tracing::warn!(error = %e, "Debounced task did not complete");
                }
                false
            }
            None => false,
        }
    }

    /// Whether a task is waiting for its delay to elapse.
    pub fn is_pending(&self) -> bool {
        self.lock_slot()
            .as_ref()
            .is_some_and(|pending| !pending.claimed.load(Ordering::SeqCst))
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<Pending>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
