use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use runbook_studio_engine::content::{
    CacheOptions, ContentCache, ContentRequest, ManualClock, RunbookId, Variant,
};
use runbook_studio_engine::{FileStore, Runbook};

const PUBLISHED: &str = "workflow Backup-Db\n{\n    param([string] $database)\n}\n";

fn store_with_published_only() -> (tempfile::TempDir, FileStore, RunbookId) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let id = RunbookId::new();
    store.write_version(id, Variant::Published, PUBLISHED).unwrap();
    (dir, store, id)
}

#[test]
fn missing_draft_falls_back_to_published_file() {
    let (_dir, store, id) = store_with_published_only();
    let cache = ContentCache::new(id, store, CacheOptions::default());

    assert_eq!(cache.get_content(ContentRequest::draft()), PUBLISHED);

    let snapshot = cache.snapshot().unwrap();
    assert_eq!(snapshot.variant(), Variant::Published);
}

#[test]
fn vanished_store_serves_last_known_content() {
    let (dir, store, id) = store_with_published_only();
    let clock = Arc::new(ManualClock::new());
    let cache =
        ContentCache::new(id, store, CacheOptions::from_minutes(5)).with_clock(clock.clone());
    cache.get_content(ContentRequest::published());

    dir.close().unwrap();
    clock.advance(Duration::from_secs(60 * 60));

    assert_eq!(cache.get_content(ContentRequest::published()), PUBLISHED);
    assert_eq!(cache.get_content(ContentRequest::published().forced()), PUBLISHED);
}

#[test]
fn unknown_runbook_is_empty() {
    let (_dir, store, _) = store_with_published_only();
    let cache = ContentCache::new(RunbookId::new(), store, CacheOptions::default());

    assert_eq!(cache.get_content(ContentRequest::draft()), "");
    assert!(cache.snapshot().is_none());
}

#[test]
fn runbook_parameters_from_store() {
    let (_dir, store, id) = store_with_published_only();
    let cache = Arc::new(ContentCache::new(id, store, CacheOptions::default()));
    let mut runbook = Runbook::new(id, "Backup-Db");
    runbook.set_checked_out(false);

    let content = cache
        .fetch_in_background(runbook.content_request(false))
        .recv()
        .unwrap();
    runbook.mark_loaded(&content);

    let parameters = runbook.parameters(cache.as_ref()).unwrap();
    assert_eq!(parameters.len(), 1);
    assert_eq!(parameters[0].display_name, "Database");
    assert_eq!(runbook.title(&content), "Backup-Db");
}
