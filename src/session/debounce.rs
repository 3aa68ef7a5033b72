use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Single-slot debounce scheduler.
///
/// Each [`Debouncer::trigger`] replaces whatever invocation is still waiting,
/// regardless of which closure it was, and restarts the quiet period. There is
/// no maximum wait: a steady stream of triggers postpones the call indefinitely.
pub struct Debouncer {
    interval: Duration,
    pending: Option<Pending>,
}

struct Pending {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedule `callback` to run once the slot has been quiet for the interval.
    /// Must be called from within a tokio runtime.
    pub fn trigger<F>(&mut self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let interval = self.interval;
        let handle = tokio::spawn({
            let token = token.clone();
            async move {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(interval) => callback(),
                }
            }
        });

        self.pending = Some(Pending { token, handle });
    }

    /// Drop the waiting invocation, if any. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) if !pending.handle.is_finished() => {
                pending.token.cancel();
                debug!("debounced invocation superseded");
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn FnOnce() + Send>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let calls = Arc::clone(&calls);
            move |value: &str| -> Box<dyn FnOnce() + Send> {
                let calls = Arc::clone(&calls);
                let value = value.to_string();
                Box::new(move || calls.lock().unwrap().push(value))
            }
        };
        (calls, make)
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_quiet_interval() {
        let (calls, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.trigger(make("a"));
        advance(299).await;
        assert!(calls.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        advance(2).await;
        assert_eq!(*calls.lock().unwrap(), vec!["a"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_only_last() {
        let (calls, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.trigger(make("a"));
        advance(100).await;
        debouncer.trigger(make("ab"));
        advance(100).await;
        debouncer.trigger(make("abc"));
        advance(1_000).await;

        assert_eq!(*calls.lock().unwrap(), vec!["abc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_resets_the_clock() {
        let (calls, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.trigger(make("a"));
        advance(250).await;
        debouncer.trigger(make("b"));
        advance(250).await;
        assert!(calls.lock().unwrap().is_empty());

        advance(60).await;
        assert_eq!(*calls.lock().unwrap(), vec!["b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_fire() {
        let (calls, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.trigger(make("first"));
        advance(400).await;
        debouncer.trigger(make("second"));
        advance(400).await;

        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_invocation() {
        let (calls, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.trigger(make("a"));
        advance(100).await;
        assert!(debouncer.cancel());
        advance(1_000).await;

        assert!(calls.lock().unwrap().is_empty());
        assert!(!debouncer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_invocation() {
        let (calls, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.trigger(make("a"));
        drop(debouncer);

        advance(1_000).await;

        assert!(calls.lock().unwrap().is_empty());
    }
}
