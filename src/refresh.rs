//! Refresh pipeline: fetch → aggregate → sanitize → merge
//!
//! One refresh is one sequential pass for one clan. A failed fetch is not an
//! error: it reports `NoData` and leaves stored seasons untouched. Aggregation
//! and sanitizing finish completely before the first write, so a malformed
//! log never produces a partial update.

use crate::riverlog::{aggregate, AggregateError, ClanTag, RemoteLogSource, SeasonId};
use crate::sanitizer::{sanitize_seasons, SanitizeError};
use crate::store::{DocumentStore, MergeOutcome, MergeStore, StoreError};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The API gave nothing usable; stored data is unchanged
    NoData { reason: String },
    Updated {
        seasons: Vec<(SeasonId, MergeOutcome)>,
        players: usize,
    },
}

#[derive(Debug)]
pub enum RefreshError {
    Aggregate(AggregateError),
    Sanitize(SanitizeError),
    Store(StoreError),
}

impl From<AggregateError> for RefreshError {
    fn from(err: AggregateError) -> Self {
        RefreshError::Aggregate(err)
    }
}

impl From<SanitizeError> for RefreshError {
    fn from(err: SanitizeError) -> Self {
        RefreshError::Sanitize(err)
    }
}

impl From<StoreError> for RefreshError {
    fn from(err: StoreError) -> Self {
        RefreshError::Store(err)
    }
}

impl std::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshError::Aggregate(e) => write!(f, "{}", e),
            RefreshError::Sanitize(e) => write!(f, "{}", e),
            RefreshError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RefreshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RefreshError::Aggregate(e) => Some(e),
            RefreshError::Sanitize(e) => Some(e),
            RefreshError::Store(e) => Some(e),
        }
    }
}

pub struct RefreshService {
    source: Arc<dyn RemoteLogSource>,
    merge: MergeStore,
}

impl RefreshService {
    pub fn new(source: Arc<dyn RemoteLogSource>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            source,
            merge: MergeStore::new(store),
        }
    }

    pub async fn refresh(&self, clan: &ClanTag) -> Result<RefreshOutcome, RefreshError> {
        log::info!("🔄 Refreshing river race log for {}", clan);

        let raw = match self.source.fetch_river_race_log(clan).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("⚠️  {}: {}", clan, e);
                return Ok(RefreshOutcome::NoData {
                    reason: e.to_string(),
                });
            }
        };

        let seasons = sanitize_seasons(aggregate(&raw, clan)?)?;
        let players = seasons.values().map(|s| s.players.len()).sum::<usize>();

        let outcomes = self.merge.merge_all(clan, seasons)?;

        log::info!(
            "✅ {}: {} seasons merged ({} player records)",
            clan,
            outcomes.len(),
            players
        );

        Ok(RefreshOutcome::Updated {
            seasons: outcomes,
            players,
        })
    }
}
