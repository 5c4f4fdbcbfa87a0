use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Enforces a fixed pause between consecutive requests.
///
/// This is a courtesy to the upstream API, not a correctness mechanism; the
/// lock is held while sleeping so callers are released one interval apart.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    state: Mutex<PacerState>,
}

#[derive(Debug, Default)]
struct PacerState {
    last_request: Option<Instant>,
    request_count: u64,
    total_wait: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PacerStats {
    pub request_count: u64,
    pub total_wait: Duration,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(PacerState::default()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until at least `interval` has passed since the previous call and
    /// returns how long it slept.
    pub async fn wait(&self) -> Duration {
        let mut state = self.state.lock().await;

        let waited = match state.last_request {
            Some(last) => {
                let elapsed = last.elapsed();
                if elapsed < self.interval {
                    let remaining = self.interval - elapsed;
                    tracing::debug!("Pacing request, waiting {:?}", remaining);
                    sleep(remaining).await;
                    remaining
                } else {
                    Duration::ZERO
                }
            }
            None => Duration::ZERO,
        };

        state.last_request = Some(Instant::now());
        state.request_count += 1;
        state.total_wait += waited;
        waited
    }

    pub async fn stats(&self) -> PacerStats {
        let state = self.state.lock().await;
        PacerStats {
            request_count: state.request_count,
            total_wait: state.total_wait,
        }
    }
}
