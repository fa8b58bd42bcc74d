//! Contract with the store that holds runbook content.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Which edition of a runbook to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// The checked-out edition being edited.
    #[default]
    Draft,
    /// The edition that runs in production.
    Published,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Draft => "draft",
            Variant::Published => "published",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunbookId(Uuid);

impl RunbookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunbookId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RunbookId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for RunbookId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for RunbookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Failure reported by a [`RunbookSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The store could not be reached at all.
    #[error("could not connect to the runbook store: {0}")]
    ConnectionFailure(String),
    /// The connection dropped mid-request.
    #[error("connection to the runbook store was closed: {0}")]
    ConnectionClosed(String),
    /// The store answered with an error, e.g. the requested version does
    /// not exist.
    #[error("runbook store rejected the request: {0}")]
    Application(String),
}

impl FetchError {
    /// True for failures where asking again for another variant is pointless.
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            FetchError::ConnectionFailure(_) | FetchError::ConnectionClosed(_)
        )
    }
}

/// Somewhere runbook content can be fetched from.
///
/// Implementations are called from worker threads and must not assume they
/// run on the thread that created them.
pub trait RunbookSource: Send + Sync {
    fn fetch_version(&self, id: RunbookId, variant: Variant) -> Result<String, FetchError>;
}

impl<S: RunbookSource + ?Sized> RunbookSource for std::sync::Arc<S> {
    fn fetch_version(&self, id: RunbookId, variant: Variant) -> Result<String, FetchError> {
        (**self).fetch_version(id, variant)
    }
}

impl<S: RunbookSource + ?Sized> RunbookSource for Box<S> {
    fn fetch_version(&self, id: RunbookId, variant: Variant) -> Result<String, FetchError> {
        (**self).fetch_version(id, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(FetchError::ConnectionFailure("dns".into()), true)]
    #[case(FetchError::ConnectionClosed("reset".into()), true)]
    #[case(FetchError::Application("no draft".into()), false)]
    fn connection_level_failures(#[case] error: FetchError, #[case] expected: bool) {
        assert_eq!(error.is_connection_level(), expected);
    }

    #[test]
    fn runbook_id_round_trips_through_text() {
        let id = RunbookId::new();
        assert_eq!(id.to_string().parse::<RunbookId>().unwrap(), id);
        assert!("not-a-uuid".parse::<RunbookId>().is_err());
    }

    #[test]
    fn variant_names() {
        assert_eq!(Variant::default(), Variant::Draft);
        assert_eq!(Variant::Published.to_string(), "published");
    }
}
