//! # Runbook Content
//!
//! Fetching runbook text from the store that holds it, and keeping a fresh
//! copy around so the editor does not go back to the store on every lookup.
//!
//! - [`remote`] - the store contract ([`RunbookSource`]) and its error kinds
//! - [`policy`] - what to do when a fetch fails
//! - [`cache`] - the snapshot cache itself

pub mod cache;
pub mod policy;
pub mod remote;

pub use cache::{
    CacheOptions, Clock, ContentCache, ContentRequest, ManualClock, Snapshot, SystemClock,
};
pub use policy::{DraftToPublished, FallbackPolicy, FallbackStep, NoFallback};
pub use remote::{FetchError, RunbookId, RunbookSource, Variant};
