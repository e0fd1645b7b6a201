use crate::riverlog::{SeasonAccumulator, SeasonId};

/// Storage identity of a season document
pub type DocumentId = i64;

/// One persisted season for one clan
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSeasonDocument {
    pub id: DocumentId,
    pub season_id: SeasonId,
    pub body: SeasonAccumulator,
}

#[derive(Debug)]
pub enum StoreError {
    /// Database could not be opened or created
    Unavailable { path: String, source: rusqlite::Error },
    Database(rusqlite::Error),
    Io(std::io::Error),
    /// Stored body does not decode as a season document
    Corrupt {
        collection: String,
        season_id: SeasonId,
        source: serde_json::Error,
    },
    Serialization(serde_json::Error),
    /// `replace_one` target no longer exists
    NotFound { collection: String, id: DocumentId },
    /// A writer panicked while holding the connection
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable { path, source } => {
                write!(f, "Storage unavailable at {}: {}", path, source)
            }
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Corrupt {
                collection,
                season_id,
                source,
            } => write!(
                f,
                "Corrupt document {} season {}: {}",
                collection, season_id, source
            ),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::NotFound { collection, id } => {
                write!(f, "Document {} not found in {}", id, collection)
            }
            StoreError::Poisoned => write!(f, "Database connection lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Unavailable { source, .. } | StoreError::Database(source) => Some(source),
            StoreError::Io(e) => Some(e),
            StoreError::Corrupt { source, .. } | StoreError::Serialization(source) => Some(source),
            StoreError::NotFound { .. } | StoreError::Poisoned => None,
        }
    }
}

/// Document store holding season documents per clan collection
///
/// Every write replaces a whole document; there are no field-level updates.
/// Implementations must make `insert_one` and `replace_one` atomic.
pub trait DocumentStore: Send + Sync {
    /// All season documents in `collection`, ordered by season id
    fn find_all(&self, collection: &str) -> Result<Vec<StoredSeasonDocument>, StoreError>;

    fn find_one(
        &self,
        collection: &str,
        season_id: SeasonId,
    ) -> Result<Option<StoredSeasonDocument>, StoreError>;

    fn insert_one(
        &self,
        collection: &str,
        season_id: SeasonId,
        body: &SeasonAccumulator,
    ) -> Result<DocumentId, StoreError>;

    /// Overwrite the document with identity `id`, keeping that identity
    fn replace_one(
        &self,
        collection: &str,
        id: DocumentId,
        season_id: SeasonId,
        body: &SeasonAccumulator,
    ) -> Result<(), StoreError>;

    /// Names of every collection holding at least one document
    fn list_collection_names(&self) -> Result<Vec<String>, StoreError>;
}
