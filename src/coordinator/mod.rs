// ABOUTME: Coordinator module for managing agent execution resources.
// ABOUTME: Contains rate limiting, load balancing, caching, and dispatch.

mod cache;
mod dispatcher;
mod load_balancer;
mod rate_limiter;
mod store;

pub use cache::ResultCache;
pub use dispatcher::Dispatcher;
pub use load_balancer::LoadBalancer;
pub use rate_limiter::{Admission, RateLimiter};
pub use store::{CacheStore, MemoryCacheStore};

#[cfg(test)]
mod cache_test;
#[cfg(test)]
mod rate_limiter_test;
