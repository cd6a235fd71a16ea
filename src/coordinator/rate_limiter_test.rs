// ABOUTME: Tests for the sliding-window rate limiter.
// ABOUTME: Covers ceilings, window expiry, rejection bookkeeping, and eviction.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::advance;

use super::rate_limiter::{Admission, RateLimiter};

#[tokio::test]
async fn test_admits_under_ceiling() {
    let limiter = RateLimiter::new(3, 16);

    for i in 0..3 {
        let admission = limiter.allow("client-a");
        assert!(
            admission.is_admitted(),
            "request {} should be admitted, got {:?}",
            i,
            admission
        );
    }
    assert_eq!(limiter.recorded("client-a"), 3);
}

#[tokio::test]
async fn test_rejects_at_ceiling() {
    let limiter = RateLimiter::new(2, 16);

    assert!(limiter.allow("client-a").is_admitted());
    assert!(limiter.allow("client-a").is_admitted());

    let admission = limiter.allow("client-a");
    assert!(!admission.is_admitted());
    let retry_after = admission.retry_after().unwrap();
    assert!(
        retry_after > Duration::ZERO && retry_after <= Duration::from_secs(60),
        "retry_after should fall inside the window, got {:?}",
        retry_after
    );
}

#[tokio::test(start_paused = true)]
async fn test_rejected_calls_record_nothing() {
    let limiter = RateLimiter::new(2, 16);

    assert!(limiter.allow("client-a").is_admitted());
    assert!(limiter.allow("client-a").is_admitted());

    // Hammer the limiter while full; none of these may occupy a slot.
    for _ in 0..10 {
        assert!(!limiter.allow("client-a").is_admitted());
    }
    assert_eq!(limiter.recorded("client-a"), 2);

    // Once the window slides past the two real requests, the full ceiling
    // is available again, proving the rejections left no ghosts behind.
    advance(Duration::from_secs(61)).await;
    assert!(limiter.allow("client-a").is_admitted());
    assert!(limiter.allow("client-a").is_admitted());
    assert!(!limiter.allow("client-a").is_admitted());
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_tracks_oldest_request() {
    let limiter = RateLimiter::new(3, 16);

    assert!(limiter.allow("client-a").is_admitted());
    advance(Duration::from_secs(10)).await;
    assert!(limiter.allow("client-a").is_admitted());
    assert!(limiter.allow("client-a").is_admitted());

    // The oldest request is 10s into a 60s window: 50s left.
    assert_eq!(
        limiter.allow("client-a"),
        Admission::Rejected {
            retry_after: Duration::from_secs(50)
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_window_slides_per_request() {
    let limiter = RateLimiter::new(2, 16);

    assert!(limiter.allow("client-a").is_admitted());
    advance(Duration::from_secs(30)).await;
    assert!(limiter.allow("client-a").is_admitted());
    assert!(!limiter.allow("client-a").is_admitted());

    // 61s after the first request it has expired, but the second (31s old)
    // still counts: exactly one slot is free.
    advance(Duration::from_secs(31)).await;
    assert!(limiter.allow("client-a").is_admitted());
    assert_eq!(
        limiter.allow("client-a"),
        Admission::Rejected {
            retry_after: Duration::from_secs(29)
        }
    );
}

#[tokio::test]
async fn test_clients_limited_independently() {
    let limiter = RateLimiter::new(1, 16);

    assert!(limiter.allow("client-a").is_admitted());
    assert!(!limiter.allow("client-a").is_admitted());

    // A full window for one client leaves others untouched.
    assert!(limiter.allow("client-b").is_admitted());
    assert_eq!(limiter.recorded("client-a"), 1);
    assert_eq!(limiter.recorded("client-b"), 1);
}

#[tokio::test]
async fn test_concurrent_checks_never_admit_past_ceiling() {
    let limiter = Arc::new(RateLimiter::new(60, 16));
    let mut handles = Vec::new();

    // 1000 tasks race on one client; exactly the ceiling may win.
    for _ in 0..1000 {
        let limiter = limiter.clone();
        handles.push(tokio::spawn(
            async move { limiter.allow("client-a").is_admitted() },
        ));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 60, "exactly the ceiling must be admitted");
    assert_eq!(limiter.recorded("client-a"), 60);
}

#[tokio::test(start_paused = true)]
async fn test_fully_stale_clients_evicted_at_capacity() {
    let limiter = RateLimiter::new(4, 2);

    assert!(limiter.allow("stale").is_admitted());
    advance(Duration::from_secs(61)).await;
    assert!(limiter.allow("live-a").is_admitted());
    assert!(limiter.allow("live-b").is_admitted());

    // "stale" had nothing left in its window, so the third client fits
    // without touching the live ones.
    assert_eq!(limiter.tracked_clients(), 2);
    assert_eq!(limiter.recorded("live-a"), 1);
    assert_eq!(limiter.recorded("live-b"), 1);
    assert_eq!(limiter.recorded("stale"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_eviction_drops_client_with_oldest_recent_request() {
    let limiter = RateLimiter::new(4, 2);

    assert!(limiter.allow("older").is_admitted());
    advance(Duration::from_secs(5)).await;
    assert!(limiter.allow("newer").is_admitted());

    // Both windows are live; the one whose newest request is oldest goes.
    assert!(limiter.allow("newest").is_admitted());
    assert_eq!(limiter.tracked_clients(), 2);
    assert_eq!(limiter.recorded("newer"), 1);
    assert_eq!(limiter.recorded("newest"), 1);
}
