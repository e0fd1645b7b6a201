//! SQLite-backed document store
//!
//! All collections share one table; a document body is the season's JSON
//! (`{"players": {...}}`) stored whole in a TEXT column:
//!
//! ```sql
//! season_documents(id, collection, season_id, body, updated_at)
//! UNIQUE(collection, season_id)
//! ```
//!
//! Every write is a single statement, so a document is either the old or the
//! new version, never a mix.

use super::document::{DocumentId, DocumentStore, StoreError, StoredSeasonDocument};
use crate::riverlog::{SeasonAccumulator, SeasonId};
use crate::sqlite_pragma::apply_optimized_pragmas;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS season_documents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        collection TEXT NOT NULL,
        season_id INTEGER NOT NULL,
        body TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_collection_season
        ON season_documents(collection, season_id);
";

pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (or create) the database at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = db_path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|source| StoreError::Unavailable {
            path: path.display().to_string(),
            source,
        })?;

        let store = Self::init(conn)?;
        log::info!("✅ Season store opened: {}", path.display());
        Ok(store)
    }

    /// In-memory database (tests, dry runs)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Unavailable {
            path: ":memory:".to_string(),
            source,
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        apply_optimized_pragmas(&conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn decode(
    collection: &str,
    id: DocumentId,
    season_id: SeasonId,
    body: &str,
) -> Result<StoredSeasonDocument, StoreError> {
    let body = serde_json::from_str(body).map_err(|source| StoreError::Corrupt {
        collection: collection.to_string(),
        season_id,
        source,
    })?;

    Ok(StoredSeasonDocument {
        id,
        season_id,
        body,
    })
}

impl DocumentStore for SqliteDocumentStore {
    fn find_all(&self, collection: &str) -> Result<Vec<StoredSeasonDocument>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, season_id, body FROM season_documents
             WHERE collection = ?1
             ORDER BY season_id ASC",
        )?;

        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((
                    row.get::<_, DocumentId>(0)?,
                    row.get::<_, SeasonId>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, season_id, body)| decode(collection, id, season_id, &body))
            .collect()
    }

    fn find_one(
        &self,
        collection: &str,
        season_id: SeasonId,
    ) -> Result<Option<StoredSeasonDocument>, StoreError> {
        let row = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT id, body FROM season_documents
                 WHERE collection = ?1 AND season_id = ?2",
                params![collection, season_id],
                |row| Ok((row.get::<_, DocumentId>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?
        };

        row.map(|(id, body)| decode(collection, id, season_id, &body))
            .transpose()
    }

    fn insert_one(
        &self,
        collection: &str,
        season_id: SeasonId,
        body: &SeasonAccumulator,
    ) -> Result<DocumentId, StoreError> {
        let json = serde_json::to_string(body)?;
        let now = chrono::Utc::now().timestamp();

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO season_documents (collection, season_id, body, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![collection, season_id, json, now],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn replace_one(
        &self,
        collection: &str,
        id: DocumentId,
        season_id: SeasonId,
        body: &SeasonAccumulator,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(body)?;
        let now = chrono::Utc::now().timestamp();

        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE season_documents
             SET season_id = ?1, body = ?2, updated_at = ?3
             WHERE id = ?4 AND collection = ?5",
            params![season_id, json, now, id, collection],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id,
            });
        }

        Ok(())
    }

    fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT collection FROM season_documents ORDER BY collection")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riverlog::PlayerAccumulator;
    use tempfile::tempdir;

    fn season_with(tag: &str, name: &str, section: u32, fame: u64, decks: u64) -> SeasonAccumulator {
        let mut player = PlayerAccumulator::new(name);
        player.add(section, fame, decks);
        let mut season = SeasonAccumulator::default();
        season.players.insert(tag.to_string(), player);
        season
    }

    #[test]
    fn test_find_one_missing_is_none() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        assert!(store.find_one("#CLAN", 1).unwrap().is_none());
        assert!(store.find_all("#CLAN").unwrap().is_empty());
    }

    #[test]
    fn test_insert_then_find() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let body = season_with("#P1", "Alice", 1, 100, 4);

        let id = store.insert_one("#CLAN", 42, &body).unwrap();
        let doc = store.find_one("#CLAN", 42).unwrap().unwrap();

        assert_eq!(doc.id, id);
        assert_eq!(doc.season_id, 42);
        assert_eq!(doc.body, body);
        // Other collections are isolated
        assert!(store.find_one("#OTHER", 42).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let body = SeasonAccumulator::default();
        store.insert_one("#CLAN", 42, &body).unwrap();
        assert!(matches!(
            store.insert_one("#CLAN", 42, &body),
            Err(StoreError::Database(_))
        ));
    }

    #[test]
    fn test_replace_keeps_identity() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let id = store
            .insert_one("#CLAN", 7, &season_with("#P1", "Alice", 1, 10, 1))
            .unwrap();

        let replacement = season_with("#P2", "Bob", 2, 20, 2);
        store.replace_one("#CLAN", id, 7, &replacement).unwrap();

        let doc = store.find_one("#CLAN", 7).unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.body, replacement);
        assert_eq!(store.find_all("#CLAN").unwrap().len(), 1);
    }

    #[test]
    fn test_replace_unknown_id_is_not_found() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let err = store
            .replace_one("#CLAN", 999, 7, &SeasonAccumulator::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 999, .. }));
    }

    #[test]
    fn test_find_all_ordered_and_collections_listed() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let body = SeasonAccumulator::default();
        store.insert_one("#B", 3, &body).unwrap();
        store.insert_one("#A", 9, &body).unwrap();
        store.insert_one("#A", 2, &body).unwrap();

        let seasons: Vec<_> = store
            .find_all("#A")
            .unwrap()
            .into_iter()
            .map(|d| d.season_id)
            .collect();
        assert_eq!(seasons, vec![2, 9]);
        assert_eq!(store.list_collection_names().unwrap(), vec!["#A", "#B"]);
    }

    #[test]
    fn test_corrupt_body_is_reported() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO season_documents (collection, season_id, body, updated_at)
                 VALUES ('#CLAN', 5, '{\"players\": {\"#P1\": {\"1_fame\": 3}}}', 0)",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.find_one("#CLAN", 5),
            Err(StoreError::Corrupt { season_id: 5, .. })
        ));
    }

    #[test]
    fn test_documents_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("clanstats.db");
        let body = season_with("#P1", "Alice", 0, 1600, 16);

        {
            let store = SqliteDocumentStore::open(&db_path).unwrap();
            store.insert_one("#CLAN", 101, &body).unwrap();
        }

        let store = SqliteDocumentStore::open(&db_path).unwrap();
        let doc = store.find_one("#CLAN", 101).unwrap().unwrap();
        assert_eq!(doc.body, body);
    }
}
