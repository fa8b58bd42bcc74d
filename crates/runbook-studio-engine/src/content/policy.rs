//! What to do when a fetch fails.

use super::remote::{FetchError, Variant};

/// Next move after a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStep {
    /// Try again for this variant.
    Retry(Variant),
    /// Stop fetching and serve whatever is cached.
    ServeCached,
}

/// Decides how a failed fetch is retried.
pub trait FallbackPolicy: Send + Sync {
    /// `attempt` counts the fetches made so far for this request, starting
    /// at 1.
    fn next_step(&self, failed: Variant, error: &FetchError, attempt: u32) -> FallbackStep;
}

/// Retry a draft that the store rejected once, against the published
/// edition. Connection failures go straight to the cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftToPublished;

impl FallbackPolicy for DraftToPublished {
    fn next_step(&self, failed: Variant, error: &FetchError, attempt: u32) -> FallbackStep {
        if failed == Variant::Draft && attempt == 1 && !error.is_connection_level() {
            FallbackStep::Retry(Variant::Published)
        } else {
            FallbackStep::ServeCached
        }
    }
}

/// Never retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl FallbackPolicy for NoFallback {
    fn next_step(&self, _failed: Variant, _error: &FetchError, _attempt: u32) -> FallbackStep {
        FallbackStep::ServeCached
    }
}
