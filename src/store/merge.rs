//! Incremental season merge
//!
//! For a season already on disk, every player in the incoming batch that is
//! also in the stored document gets the stored fields it lacks copied in
//! (older sections, unknown extra keys). Incoming values win on conflict.
//!
//! Players that only exist in the stored document are NOT carried forward:
//! the stored document is replaced wholesale by the backfilled incoming
//! season, so it holds exactly the players of the latest run.

use super::document::{DocumentStore, StoreError};
use crate::riverlog::{ClanTag, SeasonAccumulator, SeasonId, SeasonMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Replaced,
}

/// Copy fields only `existing` has into `incoming`, for players in both
pub fn backfill(existing: &SeasonAccumulator, mut incoming: SeasonAccumulator) -> SeasonAccumulator {
    for (tag, player) in incoming.players.iter_mut() {
        if let Some(stored) = existing.players.get(tag) {
            player.backfill_from(stored);
        }
    }
    incoming
}

/// Sole writer of season documents
///
/// One `merge` call is one atomic document write. Callers must not merge the
/// same season of the same clan concurrently.
pub struct MergeStore {
    store: Arc<dyn DocumentStore>,
}

impl MergeStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Merge one season for `clan`
    pub fn merge(
        &self,
        clan: &ClanTag,
        season_id: SeasonId,
        incoming: SeasonAccumulator,
    ) -> Result<MergeOutcome, StoreError> {
        let collection = clan.hashed();

        match self.store.find_one(&collection, season_id)? {
            Some(existing) => {
                let dropped = existing
                    .body
                    .players
                    .keys()
                    .filter(|tag| !incoming.players.contains_key(*tag))
                    .count();
                let merged = backfill(&existing.body, incoming);

                self.store
                    .replace_one(&collection, existing.id, season_id, &merged)?;

                log::info!(
                    "   ├─ {} season {}: replaced ({} players, {} not carried forward)",
                    collection,
                    season_id,
                    merged.players.len(),
                    dropped
                );
                Ok(MergeOutcome::Replaced)
            }
            None => {
                self.store.insert_one(&collection, season_id, &incoming)?;
                log::info!(
                    "   ├─ {} season {}: inserted ({} players)",
                    collection,
                    season_id,
                    incoming.players.len()
                );
                Ok(MergeOutcome::Inserted)
            }
        }
    }

    /// Merge every season of an aggregation batch, oldest first
    ///
    /// Stops at the first failing season; seasons already written stay written.
    pub fn merge_all(
        &self,
        clan: &ClanTag,
        seasons: SeasonMap,
    ) -> Result<Vec<(SeasonId, MergeOutcome)>, StoreError> {
        let mut outcomes = Vec::with_capacity(seasons.len());
        for (season_id, season) in seasons {
            let outcome = self.merge(clan, season_id, season)?;
            outcomes.push((season_id, outcome));
        }
        Ok(outcomes)
    }
}
