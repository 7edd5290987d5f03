//! Trailing-edge debounce for search input

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Each call to [`Debouncer::settle`] waits the full delay. Only the most
/// recent caller gets its value back; every earlier one gets `None`.
#[derive(Debug)]
pub struct Debouncer {
    generation: AtomicU64,
    delay: Duration,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            generation: AtomicU64::new(0),
            delay,
        }
    }

    pub async fn settle<T>(&self, value: T) -> Option<T> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) == ticket {
            Some(value)
        } else {
            None
        }
    }

    /// Supersede every pending call
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_single_call_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        assert_eq!(debouncer.settle("abc").await, Some("abc"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_keeps_only_last() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));
        let mut handles = Vec::new();
        for text in ["a", "ab", "abc"] {
            let d = debouncer.clone();
            handles.push(tokio::spawn(async move { d.settle(text).await }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert_eq!(results, vec![None, None, Some("abc")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_supersedes_pending() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));
        let d = debouncer.clone();
        let handle = tokio::spawn(async move { d.settle("stale").await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        debouncer.cancel();
        assert_eq!(handle.await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_spaced_beyond_delay_both_settle() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        assert_eq!(debouncer.settle(1).await, Some(1));
        assert_eq!(debouncer.settle(2).await, Some(2));
    }
}
