use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A cancellable scheduled action with "reschedule on new input" semantics
///
/// Every `schedule` call disarms the previously armed action (if it has not
/// fired yet) and arms a new one that runs after `delay` of silence. Once an
/// action has started running it is never aborted, so a write that is
/// already on the wire always completes.
///
/// Requires a running tokio runtime.
pub struct Debouncer {
    name: &'static str,
    delay: Duration,
    /// Token of the armed action; `None` when nothing is waiting to fire
    pending: Arc<Mutex<Option<u64>>>,
    next_token: u64,
    handle: Option<JoinHandle<()>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Debouncer {
    pub fn new(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            delay,
            pending: Arc::new(Mutex::new(None)),
            next_token: 0,
            handle: None,
        }
    }

    /// Arm `action` to run after the quiet period, replacing any unfired action
    pub fn schedule<F, Fut>(&mut self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.next_token += 1;
        let token = self.next_token;

        let replaced = lock(&self.pending).replace(token).is_some();
        if replaced {
            if let Some(handle) = self.handle.take() {
                // Still sleeping: the token check would also stop it, but
                // there is no reason to keep the task around.
                handle.abort();
            }
            debug!("⏱️ DEBOUNCE[{}]: timer reset", self.name);
        }

        let pending = Arc::clone(&self.pending);
        let delay = self.delay;
        let name = self.name;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut current = lock(&pending);
                if *current != Some(token) {
                    return;
                }
                *current = None;
            }
            debug!("⏱️ DEBOUNCE[{}]: firing", name);
            action().await;
        }));
    }

    /// Disarm the pending action. Returns `true` if one was waiting to fire.
    pub fn cancel(&mut self) -> bool {
        let was_pending = lock(&self.pending).take().is_some();
        if was_pending {
            if let Some(handle) = self.handle.take() {
                handle.abort();
            }
        }
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
