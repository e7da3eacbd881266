use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

/// Runs only the last of a burst of calls, once `delay` has passed without
/// a newer one. Dropping the debouncer cancels the pending call.
///
/// Only the wait is cancellable: a call whose delay has elapsed runs to
/// completion even if a newer call arrives meanwhile.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Scheduled>,
}

#[derive(Debug)]
struct Scheduled {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

impl Scheduled {
    fn is_waiting(&self) -> bool {
        !self.fired.load(Ordering::SeqCst) && !self.handle.is_finished()
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `task`, replacing any call still waiting
    pub fn call<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
            task.await;
        });

        self.pending = Some(Scheduled { handle, fired });
    }

    /// Drop the waiting call, if any; a call already running is left alone
    pub fn cancel(&mut self) {
        if let Some(scheduled) = self.pending.take() {
            if scheduled.is_waiting() {
                scheduled.handle.abort();
            }
        }
    }

    /// True while a call is waiting out its delay
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(Scheduled::is_waiting)
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
