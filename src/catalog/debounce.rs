use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Trailing-edge debounce: of a burst of calls only the last one settles
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay; `true` when no newer call arrived meanwhile
    pub async fn settle(&self) -> bool {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.generation.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_call_in_burst_settles() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));

        let first = tokio::spawn({
            let debouncer = Arc::clone(&debouncer);
            async move { debouncer.settle().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = tokio::spawn({
            let debouncer = Arc::clone(&debouncer);
            async move { debouncer.settle().await }
        });

        assert!(!first.await.unwrap());
        assert!(second.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_all_settle() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        assert!(debouncer.settle().await);
        assert!(debouncer.settle().await);
    }
}
