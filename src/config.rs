// ABOUTME: Configuration for the coordinator's supporting services.
// ABOUTME: Production defaults with builder-style overrides.

use std::time::Duration;

/// Tunable limits for admission, balancing, caching, and workflows.
///
/// `Default` gives the production values; builder methods override
/// individual limits:
///
/// ```
/// use foreman::config::CoordinatorConfig;
///
/// let config = CoordinatorConfig::default()
///     .requests_per_minute(120)
///     .max_rounds(5);
/// assert_eq!(config.requests_per_minute, 120);
/// ```
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Requests one client may make per sliding 60-second window.
    pub requests_per_minute: u32,
    /// Consecutive failures after which a worker is excluded from selection.
    pub error_threshold: u32,
    /// Coding/testing rounds allowed per workflow run.
    pub max_rounds: u32,
    /// Time-to-live for cached worker results.
    pub cache_ttl: Duration,
    /// In-process cache entries kept before eviction kicks in.
    pub cache_capacity: usize,
    /// Distinct clients tracked by the rate limiter before eviction.
    pub client_capacity: usize,
    /// Wall-clock budget for a single worker invocation.
    pub request_timeout: Duration,
    /// Longest input the validator accepts, in bytes.
    pub max_input_len: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            error_threshold: 3,
            max_rounds: 3,
            cache_ttl: Duration::from_secs(3600),
            cache_capacity: 1024,
            client_capacity: 1024,
            request_timeout: Duration::from_secs(300),
            max_input_len: 10_000,
        }
    }
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests_per_minute(mut self, requests: u32) -> Self {
        self.requests_per_minute = requests;
        self
    }

    pub fn error_threshold(mut self, threshold: u32) -> Self {
        self.error_threshold = threshold;
        self
    }

    pub fn max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn client_capacity(mut self, capacity: usize) -> Self {
        self.client_capacity = capacity;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = len;
        self
    }
}
