pub mod content;
pub mod editing;
pub mod io;
pub mod models;
pub mod params;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use content::{
    CacheOptions, ContentCache, ContentRequest, FetchError, RunbookId, RunbookSource, Variant,
};
pub use editing::{Bookmark, BookmarkKind, BookmarkStore, EditorOptions, RunbookEditor};
pub use io::*;
pub use models::Runbook;
pub use params::{
    ExtractError, ParameterDescriptor, ParameterExtractor, ScriptGrammar, extract_parameters,
};
