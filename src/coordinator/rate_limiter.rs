// ABOUTME: Sliding-window rate limiter for per-client admission control.
// ABOUTME: Checks and records atomically; rejected calls never consume a slot.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Length of the sliding admission window.
const WINDOW: Duration = Duration::from_secs(60);

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may proceed and its timestamp has been recorded.
    Admitted,
    /// The request is over the ceiling; retry once the oldest recorded
    /// request leaves the window.
    Rejected { retry_after: Duration },
}

impl Admission {
    /// True when the request was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }

    /// The wait until a slot frees up, for rejected requests.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Admission::Admitted => None,
            Admission::Rejected { retry_after } => Some(*retry_after),
        }
    }
}

/// Mutable state for the rate limiter, protected by a single mutex.
struct RateLimiterState {
    /// Admission timestamps per client, oldest first. Windows are never
    /// empty between calls.
    windows: HashMap<String, Vec<Instant>>,
}

/// Sliding-window rate limiter for per-client admission control.
///
/// Each client gets an independent 60-second window; a request is admitted
/// while fewer than `ceiling` prior requests fall inside it. The check is
/// synchronous and never blocks the caller: the mutex makes check-and-record
/// atomic, so concurrent checks cannot admit past the ceiling.
pub struct RateLimiter {
    state: Mutex<RateLimiterState>,
    ceiling: usize,
    max_clients: usize,
}

impl RateLimiter {
    /// Create a new sliding-window rate limiter.
    ///
    /// # Arguments
    ///
    /// * `ceiling` - Requests admitted per client per window.
    /// * `max_clients` - Distinct clients tracked before eviction.
    ///
    /// # Panics
    ///
    /// Panics if `ceiling` or `max_clients` is zero.
    pub fn new(ceiling: u32, max_clients: usize) -> Self {
        assert!(ceiling > 0, "ceiling must be positive");
        assert!(max_clients > 0, "max_clients must be positive");

        Self {
            state: Mutex::new(RateLimiterState {
                windows: HashMap::new(),
            }),
            ceiling: ceiling as usize,
            max_clients,
        }
    }

    /// Check whether `client_id` may make a request right now.
    ///
    /// Expired timestamps are pruned first. Under the ceiling, the request
    /// is recorded and admitted; at the ceiling it is rejected with the
    /// wait until the oldest remaining timestamp expires, and nothing is
    /// recorded.
    pub fn allow(&self, client_id: &str) -> Admission {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();

        if !state.windows.contains_key(client_id) && state.windows.len() >= self.max_clients {
            self.evict(&mut state, now);
        }

        let window = state.windows.entry(client_id.to_string()).or_default();
        window.retain(|recorded| now.duration_since(*recorded) < WINDOW);

        if window.len() >= self.ceiling {
            // Timestamps only grow, so the first retained entry is the oldest.
            let retry_after = WINDOW - now.duration_since(window[0]);
            tracing::debug!(client = client_id, ?retry_after, "admission rejected");
            return Admission::Rejected { retry_after };
        }

        window.push(now);
        Admission::Admitted
    }

    /// Drop client windows whose every timestamp has expired; if that frees
    /// nothing, drop the client whose most recent request is oldest.
    fn evict(&self, state: &mut RateLimiterState, now: Instant) {
        state
            .windows
            .retain(|_, window| window.iter().any(|t| now.duration_since(*t) < WINDOW));

        if state.windows.len() >= self.max_clients {
            let stalest = state
                .windows
                .iter()
                .min_by_key(|(_, window)| window.last().copied())
                .map(|(client, _)| client.clone());
            if let Some(client) = stalest {
                tracing::debug!(client = %client, "evicting stalest client window");
                state.windows.remove(&client);
            }
        }
    }

    /// Number of requests currently recorded for a client (for
    /// testing/monitoring).
    ///
    /// Note: This method prunes the client's expired timestamps as a side
    /// effect.
    pub fn recorded(&self, client_id: &str) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();
        let Some(window) = state.windows.get_mut(client_id) else {
            return 0;
        };
        window.retain(|recorded| now.duration_since(*recorded) < WINDOW);
        let len = window.len();
        if len == 0 {
            state.windows.remove(client_id);
        }
        len
    }

    /// Number of distinct clients currently tracked (for testing/monitoring).
    pub fn tracked_clients(&self) -> usize {
        self.state.lock().unwrap().windows.len()
    }
}
