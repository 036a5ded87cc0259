//! Sliding-window admission control shared by every run in the process.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

/// Admits at most `max_per_window` requests in any rolling 60 second window.
///
/// Admission is serialized through an async mutex: concurrent callers queue
/// on the lock, and a caller that finds the window full sleeps until the
/// oldest admission ages out (the lock is released while sleeping).
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn per_minute(max_per_minute: u32) -> Self {
        Self::with_window(max_per_minute, WINDOW)
    }

    pub fn with_window(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window: max_per_window.max(1) as usize,
            window,
            admitted: Mutex::new(VecDeque::new()),
        }
    }

    /// Waits until a request may be sent, then records it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut admitted = self.admitted.lock().await;
                let now = Instant::now();
                while admitted
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    admitted.pop_front();
                }

                if admitted.len() < self.max_per_window {
                    admitted.push_back(now);
                    return;
                }

                match admitted.front() {
                    Some(oldest) => (*oldest + self.window).saturating_duration_since(now),
                    None => Duration::ZERO,
                }
            };

            debug!("Rate limit window full, waiting {}ms", wait.as_millis());
            tokio::time::sleep(wait).await;
        }
    }

    /// Requests admitted in the current window.
    #[cfg(test)]
    pub async fn in_flight_window(&self) -> usize {
        let mut admitted = self.admitted.lock().await;
        let now = Instant::now();
        admitted.retain(|t| now.duration_since(*t) < self.window);
        admitted.len()
    }
}
