use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

const TICK: Duration = Duration::from_secs(1);

/// OTP resend countdown
///
/// One tokio task per running countdown, ticking once a second. Restarting
/// aborts the previous task, as does dropping the countdown.
#[derive(Debug, Default)]
pub struct Countdown {
    remaining: Arc<AtomicU32>,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    /// A countdown at zero with no task
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Start counting down from `seconds`
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(seconds: u32) -> Self {
        let mut countdown = Self::idle();
        countdown.restart(seconds);
        countdown
    }

    pub fn restart(&mut self, seconds: u32) {
        self.cancel();
        self.remaining.store(seconds, Ordering::SeqCst);
        if seconds == 0 {
            return;
        }

        let remaining = Arc::clone(&self.remaining);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            loop {
                ticker.tick().await;
                let previous = remaining
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |value| {
                        value.checked_sub(1)
                    })
                    .unwrap_or(0);
                if previous <= 1 {
                    break;
                }
            }
        }));
    }

    /// Stop the task and drop to zero
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.remaining.store(0, Ordering::SeqCst);
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.remaining() > 0
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Render seconds as `mm:ss`
#[must_use]
pub fn format_timer(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(60), "01:00");
        assert_eq!(format_timer(59), "00:59");
        assert_eq!(format_timer(5), "00:05");
        assert_eq!(format_timer(0), "00:00");
        assert_eq!(format_timer(754), "12:34");
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ticks_once_per_second() {
        let countdown = Countdown::start(60);
        assert_eq!(countdown.remaining(), 60);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(countdown.remaining(), 59);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(countdown.remaining(), 49);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_running_timer() {
        let mut countdown = Countdown::start(60);
        tokio::time::sleep(Duration::from_millis(30_500)).await;
        assert_eq!(countdown.remaining(), 30);

        countdown.restart(60);
        assert_eq!(countdown.remaining(), 60);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        // A leftover task would have decremented twice per second
        assert_eq!(countdown.remaining(), 58);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_at_zero() {
        let mut countdown = Countdown::start(10);
        countdown.cancel();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(countdown.remaining(), 0);
    }
}
