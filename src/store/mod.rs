//! Persistence of season documents
//!
//! - `document` - `DocumentStore` trait, `StoredSeasonDocument`, `StoreError`
//! - `sqlite` - SQLite-backed `DocumentStore`
//! - `merge` - `MergeStore`, the only writer of season documents
//!
//! Each clan's documents live in their own collection named by the clan's
//! `#`-prefixed tag; within a collection a document is keyed by `season_id`.

pub mod document;
pub mod merge;
pub mod sqlite;

pub use document::{DocumentId, DocumentStore, StoreError, StoredSeasonDocument};
pub use merge::{backfill, MergeOutcome, MergeStore};
pub use sqlite::SqliteDocumentStore;
