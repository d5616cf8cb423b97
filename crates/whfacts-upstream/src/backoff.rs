//! Retry policy for transient upstream failures.
//!
//! The upstream signals throttling with HTTP 429 plus one of two hint
//! headers: `x-lognex-retry-after` (whole seconds) or
//! `x-lognex-retry-timeinterval` (milliseconds). 5xx statuses are treated
//! as equally transient. The wait before a retry is
//! `max(current_backoff, server_hint) * (1 + jitter)`; the local backoff
//! floor grows multiplicatively until capped, so a server hint always
//! dominates a smaller local floor but never shortens a larger one.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

pub(crate) const MAX_JITTER: f64 = 0.25;

const DEFAULT_MAX_ATTEMPTS: u32 = 6;
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const DEFAULT_GROWTH_FACTOR: f64 = 1.7;
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(15);

/// Bounds for the per-request retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total requests issued per logical call, first attempt included.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub growth_factor: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Default policy with a different attempt ceiling.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// Statuses worth retrying: throttling and transient server errors.
pub(crate) fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Retry delay requested by the server, if any.
///
/// `x-lognex-retry-after` carries seconds (floored at 1s),
/// `x-lognex-retry-timeinterval` carries milliseconds (floored at 500ms);
/// the seconds header wins when both are present.
pub(crate) fn server_hint(headers: &HeaderMap) -> Option<Duration> {
    if let Some(secs) = header_f64(headers, "x-lognex-retry-after") {
        return Some(Duration::from_secs_f64(secs.max(1.0)));
    }
    if let Some(millis) = header_f64(headers, "x-lognex-retry-timeinterval") {
        return Some(Duration::from_secs_f64((millis / 1000.0).max(0.5)));
    }
    None
}

fn header_f64(headers: &HeaderMap, name: &str) -> Option<f64> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// The actual sleep before the next attempt: the larger of the local
/// backoff floor and the server hint, inflated by `jitter` (clamped to
/// [0, [`MAX_JITTER`]]).
pub(crate) fn wait_before_retry(
    current_backoff: Duration,
    hint: Option<Duration>,
    jitter: f64,
) -> Duration {
    let floor = hint.map_or(current_backoff, |h| h.max(current_backoff));
    floor.mul_f64(1.0 + jitter.clamp(0.0, MAX_JITTER))
}

/// The backoff floor for the attempt after this one.
pub(crate) fn grown(policy: &RetryPolicy, current_backoff: Duration) -> Duration {
    current_backoff
        .mul_f64(policy.growth_factor)
        .min(policy.max_backoff)
}
