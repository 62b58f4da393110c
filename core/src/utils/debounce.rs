//! Last-call-wins debouncing on the tokio timer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

type Action<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Defers an action until `wait` has passed without another call.
///
/// Each call cancels the pending invocation, if any, and restarts the timer
/// with the new arguments. Only one timer is ever armed. Calls must be made
/// from inside a tokio runtime.
pub struct Debouncer<A> {
    wait: Duration,
    action: Action<A>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(wait: Duration, action: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            wait,
            action: Arc::new(action),
            pending: Mutex::new(None),
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn call(&self, args: A) {
        let action = Arc::clone(&self.action);
        let wait = self.wait;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            action(args);
        });
        if let Some(previous) = self.slot().replace(handle) {
            previous.abort();
        }
    }

    /// Drop the pending invocation without running it.
    pub fn cancel(&self) {
        if let Some(previous) = self.slot().take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot().as_ref().is_some_and(|h| !h.is_finished())
    }

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        let slot = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    type Log = Arc<Mutex<Vec<(Duration, u32)>>>;

    fn recording(start: Instant, wait_ms: u64) -> (Debouncer<u32>, Log) {
        let log: Log = Arc::default();
        let sink = Arc::clone(&log);
        let debouncer = Debouncer::new(Duration::from_millis(wait_ms), move |arg| {
            sink.lock().unwrap().push((start.elapsed(), arg));
        });
        (debouncer, log)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_with_last_arguments() {
        let start = Instant::now();
        let (debouncer, log) = recording(start, 50);

        debouncer.call(1);
        sleep(Duration::from_millis(10)).await;
        debouncer.call(2);
        sleep(Duration::from_millis(10)).await;
        debouncer.call(3);

        sleep(Duration::from_millis(49)).await;
        assert!(log.lock().unwrap().is_empty());

        sleep(Duration::from_millis(100)).await;
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        let (at, arg) = log[0];
        assert_eq!(arg, 3);
        assert!(at >= Duration::from_millis(70) && at <= Duration::from_millis(71), "{at:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_calls_each_fire() {
        let (debouncer, log) = recording(Instant::now(), 20);

        debouncer.call(1);
        sleep(Duration::from_millis(50)).await;
        debouncer.call(2);
        sleep(Duration::from_millis(50)).await;

        let args: Vec<u32> = log.lock().unwrap().iter().map(|(_, a)| *a).collect();
        assert_eq!(args, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_pending_call() {
        let (debouncer, log) = recording(Instant::now(), 20);

        debouncer.call(7);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        sleep(Duration::from_millis(100)).await;

        assert!(log.lock().unwrap().is_empty());
        assert!(!debouncer.is_pending());
    }
}
