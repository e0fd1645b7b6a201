//! clanstats - river race participation tracker
//!
//! Pulls a clan's river race log from the game API, folds it into
//! per-season, per-player section totals, and persists those totals
//! incrementally in SQLite so history survives the API's short retention.
//!
//! ## Data flow
//!
//! ```text
//! RemoteLogSource (HTTP GET riverracelog)
//!     ↓
//! aggregate() → SeasonMap (season → player → section totals)
//!     ↓
//! sanitize_seasons() (strip unsafe characters from string leaves)
//!     ↓
//! MergeStore::merge() (field backfill + atomic replace per season)
//!     ↓
//! SQLite season_documents
//!     ↓
//! QueryProjector::project() → ranked Fame / Decks Used tables
//!     ↓
//! Terminal UI
//! ```

#[cfg(test)]
mod tests;

pub mod config;
pub mod query;
pub mod refresh;
pub mod riverlog;
pub mod sanitizer;
pub mod sqlite_pragma;
pub mod store;
pub mod ui;

pub use config::{Config, ConfigError};
pub use query::{Metric, QueryError, QueryProjector, RankedRow, RankedTable, SeasonView};
pub use refresh::{RefreshError, RefreshOutcome, RefreshService};
pub use riverlog::{
    aggregate, ClanTag, ClashApiClient, FetchError, PlayerAccumulator, RemoteLogSource,
    SeasonAccumulator, SeasonId, SeasonMap, SectionIndex, SectionTotals,
};
pub use store::{DocumentStore, MergeOutcome, MergeStore, SqliteDocumentStore, StoreError};
