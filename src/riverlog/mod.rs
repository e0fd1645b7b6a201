//! River race log ingestion
//!
//! - `types` - raw API payload and the per-season accumulators it folds into
//! - `source` - `RemoteLogSource` trait and the HTTP client for the game API
//! - `aggregator` - pure fold from a raw log to a `SeasonMap`

pub mod aggregator;
pub mod source;
pub mod types;

pub use aggregator::{aggregate, aggregate_log, AggregateError};
pub use source::{ClashApiClient, FetchError, RemoteLogSource};
pub use types::{
    ClanTag, InvalidClanTag, Participant, PlayerAccumulator, RawLogItem, RiverRaceLog,
    SeasonAccumulator, SeasonId, SeasonMap, SectionIndex, SectionTotals, Standing, StandingClan,
};
