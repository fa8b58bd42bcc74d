use crate::content::{FetchError, RunbookId, RunbookSource, Variant};
use relative_path::RelativePathBuf;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Runbook store not found: {0}")]
    StoreNotFound(PathBuf),
    #[error("Runbook version not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for FetchError {
    fn from(error: StoreError) -> Self {
        let message = error.to_string();
        match error {
            StoreError::StoreNotFound(_) => FetchError::ConnectionFailure(message),
            StoreError::NotFound(_) => FetchError::Application(message),
            StoreError::Io(io)
                if matches!(io.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) =>
            {
                FetchError::Application(message)
            }
            StoreError::Io(_) => FetchError::ConnectionClosed(message),
        }
    }
}

/// A runbook found in a store and the variants it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRunbook {
    pub id: RunbookId,
    pub variants: Vec<Variant>,
}

/// Runbooks kept on disk, one directory per runbook:
///
/// ```text
/// <root>/<runbook-id>/draft.ps1
/// <root>/<runbook-id>/published.ps1
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of one variant relative to the store root
    pub fn version_path(id: RunbookId, variant: Variant) -> RelativePathBuf {
        RelativePathBuf::from(id.to_string()).join(format!("{variant}.ps1"))
    }

    /// Read one variant of a runbook
    pub fn read_version(&self, id: RunbookId, variant: Variant) -> Result<String, StoreError> {
        validate_store_dir(&self.root)?;
        let absolute_path = Self::version_path(id, variant).to_path(&self.root);
        if !absolute_path.exists() {
            return Err(StoreError::NotFound(absolute_path));
        }
        fs::read_to_string(&absolute_path).map_err(StoreError::Io)
    }

    /// Write one variant of a runbook
    pub fn write_version(
        &self,
        id: RunbookId,
        variant: Variant,
        content: &str,
    ) -> Result<(), StoreError> {
        let absolute_path = Self::version_path(id, variant).to_path(&self.root);

        // Create parent directories if they don't exist
        if let Some(parent) = absolute_path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }

        fs::write(&absolute_path, content).map_err(StoreError::Io)
    }

    /// Every runbook in the store, sorted by id. Directories whose name is
    /// not a runbook id are ignored.
    pub fn list_runbooks(&self) -> Result<Vec<StoredRunbook>, StoreError> {
        validate_store_dir(&self.root)?;

        let mut runbooks = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(StoreError::Io)? {
            let entry = entry.map_err(StoreError::Io)?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(id) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.parse::<RunbookId>().ok())
            else {
                continue;
            };

            let variants = [Variant::Draft, Variant::Published]
                .into_iter()
                .filter(|variant| Self::version_path(id, *variant).to_path(&self.root).is_file())
                .collect();
            runbooks.push(StoredRunbook { id, variants });
        }

        runbooks.sort_by_key(|runbook| runbook.id);
        Ok(runbooks)
    }
}

impl RunbookSource for FileStore {
    fn fetch_version(&self, id: RunbookId, variant: Variant) -> Result<String, FetchError> {
        log::debug!("Reading {variant} of runbook {id} from {}", self.root.display());
        self.read_version(id, variant).map_err(FetchError::from)
    }
}

pub fn validate_store_dir(path: &Path) -> Result<(), StoreError> {
    if !path.is_dir() {
        return Err(StoreError::StoreNotFound(path.to_path_buf()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_runbook, create_test_store};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_written_version() {
        // Given a store with a draft written through the store
        let store_dir = create_test_store();
        let store = FileStore::new(store_dir.path());
        let id = RunbookId::new();
        store
            .write_version(id, Variant::Draft, "workflow W { }")
            .unwrap();

        // When reading it back
        let content = store.read_version(id, Variant::Draft).unwrap();

        // Then the content is unchanged and lives where expected
        assert_eq!(content, "workflow W { }");
        assert!(store_dir.path().join(id.to_string()).join("draft.ps1").is_file());
    }

    #[test]
    fn test_missing_store_is_a_connection_failure() {
        let store = FileStore::new("/this/path/does/not/exist");

        let error = store.fetch_version(RunbookId::new(), Variant::Draft).unwrap_err();

        assert!(matches!(error, FetchError::ConnectionFailure(_)));
        assert!(error.to_string().contains("Runbook store not found"));
    }

    #[test]
    fn test_missing_version_is_an_application_error() {
        let store_dir = create_test_store();
        let id = RunbookId::new();
        create_test_runbook(&store_dir, id, Variant::Published, "Get-Date");
        let store = FileStore::new(store_dir.path());

        let error = store.fetch_version(id, Variant::Draft).unwrap_err();

        assert!(matches!(error, FetchError::Application(_)));
        assert_eq!(store.fetch_version(id, Variant::Published).unwrap(), "Get-Date");
    }

    #[test]
    fn test_other_io_errors_are_connection_closed() {
        let error = StoreError::Io(std::io::Error::other("disk went away"));
        assert!(matches!(FetchError::from(error), FetchError::ConnectionClosed(_)));

        let denied = StoreError::Io(std::io::Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(FetchError::from(denied), FetchError::Application(_)));
    }

    #[test]
    fn test_list_runbooks() {
        // Given a store with two runbooks and some unrelated entries
        let store_dir = create_test_store();
        let first = RunbookId::new();
        let second = RunbookId::new();
        create_test_runbook(&store_dir, first, Variant::Draft, "a");
        create_test_runbook(&store_dir, first, Variant::Published, "a");
        create_test_runbook(&store_dir, second, Variant::Published, "b");
        fs::create_dir(store_dir.path().join("not-a-runbook")).unwrap();
        fs::write(store_dir.path().join("README.md"), "notes").unwrap();

        // When listing
        let runbooks = FileStore::new(store_dir.path()).list_runbooks().unwrap();

        // Then only the runbooks are found, with their variants
        let mut expected = vec![
            StoredRunbook {
                id: first,
                variants: vec![Variant::Draft, Variant::Published],
            },
            StoredRunbook {
                id: second,
                variants: vec![Variant::Published],
            },
        ];
        expected.sort_by_key(|runbook| runbook.id);
        assert_eq!(runbooks, expected);
    }

    #[test]
    fn test_version_path() {
        let id: RunbookId = "0b5a8a4e-5a4c-4f7e-9d1a-2c7d3a1e9f00".parse().unwrap();
        assert_eq!(
            FileStore::version_path(id, Variant::Published).as_str(),
            "0b5a8a4e-5a4c-4f7e-9d1a-2c7d3a1e9f00/published.ps1"
        );
    }
}
