use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tempfile::TempDir;

use crate::content::{FetchError, RunbookId, RunbookSource, Variant};

/// Create a temporary runbook store directory
pub fn create_test_store() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Write one variant of a runbook into a store directory
pub fn create_test_runbook(
    store: &TempDir,
    id: RunbookId,
    variant: Variant,
    content: &str,
) -> PathBuf {
    let dir = store.path().join(id.to_string());
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{variant}.ps1"));
    fs::write(&path, content).unwrap();
    path
}

/// In-memory source with canned responses that records every fetch
#[derive(Debug, Default)]
pub struct StubSource {
    responses: Mutex<HashMap<Variant, Result<String, FetchError>>>,
    calls: Mutex<Vec<Variant>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft(self, body: &str) -> Self {
        self.set(Variant::Draft, Ok(body.to_string()));
        self
    }

    pub fn with_published(self, body: &str) -> Self {
        self.set(Variant::Published, Ok(body.to_string()));
        self
    }

    pub fn with_error(self, variant: Variant, error: FetchError) -> Self {
        self.set(variant, Err(error));
        self
    }

    pub fn set(&self, variant: Variant, response: Result<String, FetchError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(variant, response);
    }

    pub fn calls(&self) -> Vec<Variant> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RunbookSource for StubSource {
    fn fetch_version(&self, _id: RunbookId, variant: Variant) -> Result<String, FetchError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(variant);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&variant)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Application(format!("no {variant} version"))))
    }
}
