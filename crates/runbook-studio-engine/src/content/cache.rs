//! # Content Cache
//!
//! Answers "what is the current text of this runbook?" for one runbook. A
//! snapshot of the last fetched body is kept and served for as long as it is
//! fresh; otherwise the store is asked again. When the store cannot deliver,
//! the configured [`FallbackPolicy`] decides whether another variant is
//! tried, and if nothing works the last known body (however old) or an empty
//! string is returned. Lookups never fail.
//!
//! The snapshot lock is only held to read or replace the snapshot, never
//! while the store is being asked, so a slow fetch does not block readers.
//! Concurrent refreshes are not merged; whichever finishes last wins.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use super::policy::{DraftToPublished, FallbackPolicy, FallbackStep};
use super::remote::{RunbookId, RunbookSource, Variant};

/// Upper bound on fetches per lookup, whatever the policy says.
const MAX_ATTEMPTS: u32 = 4;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// How long a fetched body is served without asking the store again.
    pub freshness: Duration,
}

impl CacheOptions {
    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            freshness: Duration::from_secs(minutes * 60),
        }
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self::from_minutes(30)
    }
}

/// The last body fetched for a runbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    body: String,
    fetched_at: Instant,
    variant: Variant,
    requested: Variant,
    stale: bool,
}

impl Snapshot {
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    /// The variant the body came from.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The variant that was asked for. Differs from [`Self::variant`] when
    /// the policy fell back to another one.
    pub fn requested(&self) -> Variant {
        self.requested
    }

    /// True once [`ContentCache::invalidate`] has been called.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn serves(&self, variant: Variant) -> bool {
        self.variant == variant || self.requested == variant
    }
}

/// A content lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentRequest {
    pub variant: Variant,
    /// Skip the snapshot and always ask the store.
    pub force: bool,
}

impl ContentRequest {
    pub fn draft() -> Self {
        Self {
            variant: Variant::Draft,
            force: false,
        }
    }

    pub fn published() -> Self {
        Self {
            variant: Variant::Published,
            force: false,
        }
    }

    pub fn forced(self) -> Self {
        Self {
            force: true,
            ..self
        }
    }
}

pub struct ContentCache<S> {
    id: RunbookId,
    source: S,
    policy: Box<dyn FallbackPolicy>,
    clock: Arc<dyn Clock>,
    options: CacheOptions,
    snapshot: Mutex<Option<Snapshot>>,
}

impl<S: RunbookSource> ContentCache<S> {
    pub fn new(id: RunbookId, source: S, options: CacheOptions) -> Self {
        Self {
            id,
            source,
            policy: Box::new(DraftToPublished),
            clock: Arc::new(SystemClock),
            options,
            snapshot: Mutex::new(None),
        }
    }

    pub fn with_policy(mut self, policy: impl FallbackPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> RunbookId {
        self.id
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current text of the runbook.
    pub fn get_content(&self, request: ContentRequest) -> String {
        if !request.force
            && let Some(body) = self.fresh_body(request.variant)
        {
            log::debug!("Serving cached {} of runbook {}", request.variant, self.id);
            return body;
        }

        let mut variant = request.variant;
        let mut attempt = 0;
        while attempt < MAX_ATTEMPTS {
            attempt += 1;
            log::debug!("Fetching {variant} of runbook {} (attempt {attempt})", self.id);

            let error = match self.source.fetch_version(self.id, variant) {
                Ok(body) => {
                    self.replace_snapshot(Snapshot {
                        body: body.clone(),
                        fetched_at: self.clock.now(),
                        variant,
                        requested: request.variant,
                        stale: false,
                    });
                    return body;
                }
                Err(error) => error,
            };

            log::warn!("Fetching {variant} of runbook {} failed: {error}", self.id);
            match self.policy.next_step(variant, &error, attempt) {
                FallbackStep::Retry(next) => variant = next,
                FallbackStep::ServeCached => break,
            }
        }

        self.last_known_body()
    }

    /// Mark the snapshot stale so the next lookup asks the store. The body is
    /// kept as a last resort.
    pub fn invalidate(&self) {
        if let Some(snapshot) = self.lock().as_mut() {
            snapshot.stale = true;
        }
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.lock().clone()
    }

    fn fresh_body(&self, variant: Variant) -> Option<String> {
        let now = self.clock.now();
        let guard = self.lock();
        let snapshot = guard.as_ref()?;
        let age = now.saturating_duration_since(snapshot.fetched_at);
        (!snapshot.stale && age < self.options.freshness && snapshot.serves(variant))
            .then(|| snapshot.body.clone())
    }

    fn replace_snapshot(&self, snapshot: Snapshot) {
        *self.lock() = Some(snapshot);
    }

    fn last_known_body(&self) -> String {
        match self.lock().as_ref() {
            Some(snapshot) => {
                log::warn!(
                    "Serving last known {} of runbook {} fetched {:?} ago",
                    snapshot.variant,
                    self.id,
                    self.clock.now().saturating_duration_since(snapshot.fetched_at)
                );
                snapshot.body.clone()
            }
            None => {
                log::error!("No content available for runbook {}", self.id);
                String::new()
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Snapshot>> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: RunbookSource + 'static> ContentCache<S> {
    /// Run the lookup on a worker thread. The text arrives on the returned
    /// channel; dropping the receiver discards it but still updates the
    /// snapshot.
    pub fn fetch_in_background(self: &Arc<Self>, request: ContentRequest) -> Receiver<String> {
        let (tx, rx) = mpsc::channel();

        let cache = Arc::clone(self);
        let worker_tx = tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("fetch-{}", self.id))
            .spawn(move || {
                let _ = worker_tx.send(cache.get_content(request));
            });

        if let Err(error) = spawned {
            log::warn!("Could not start fetch thread, fetching inline: {error}");
            let _ = tx.send(self.get_content(request));
        }

        rx
    }
}

impl<S> std::fmt::Debug for ContentCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("id", &self.id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
