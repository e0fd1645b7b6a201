//! Read-side projection of stored seasons into ranked tables
//!
//! Each stored season becomes two tables, one per metric. A table has one
//! row per player with that metric's per-section values, their `total`, and
//! the player's name; rows are sorted by `total`, highest first.

use crate::riverlog::{ClanTag, SeasonAccumulator, SeasonId, SectionIndex, SectionTotals};
use crate::store::{DocumentStore, StoreError, StoredSeasonDocument};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Fame,
    DecksUsed,
}

impl Metric {
    pub fn value(&self, totals: &SectionTotals) -> u64 {
        match self {
            Metric::Fame => totals.fame,
            Metric::DecksUsed => totals.decks_used,
        }
    }

    /// Suffix of the stored per-section column (`"{section}_{suffix}"`)
    pub fn column_suffix(&self) -> &'static str {
        match self {
            Metric::Fame => "fame",
            Metric::DecksUsed => "decks_used",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Fame => "Fame",
            Metric::DecksUsed => "Decks Used",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRow {
    pub tag: String,
    pub name: String,
    /// Aligned with `RankedTable::sections`; `None` where the player has no
    /// record for that section
    pub values: Vec<Option<u64>>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTable {
    pub metric: Metric,
    /// Every section seen in the season, ascending
    pub sections: Vec<SectionIndex>,
    pub rows: Vec<RankedRow>,
}

impl RankedTable {
    pub fn from_season(season: &SeasonAccumulator, metric: Metric) -> Self {
        let sections: Vec<SectionIndex> = season
            .players
            .values()
            .flat_map(|p| p.sections.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut rows: Vec<RankedRow> = season
            .players
            .iter()
            .map(|(tag, player)| {
                let values: Vec<Option<u64>> = sections
                    .iter()
                    .map(|s| player.sections.get(s).map(|t| metric.value(t)))
                    .collect();
                RankedRow {
                    tag: tag.clone(),
                    name: player.name.clone(),
                    total: values.iter().flatten().sum(),
                    values,
                }
            })
            .collect();

        // Stable: ties keep player tag order
        rows.sort_by(|a, b| b.total.cmp(&a.total));

        Self {
            metric,
            sections,
            rows,
        }
    }

    /// Column names: per-section columns, then `total`, then `name`
    pub fn columns(&self) -> Vec<String> {
        self.sections
            .iter()
            .map(|s| format!("{}_{}", s, self.metric.column_suffix()))
            .chain(["total".to_string(), "name".to_string()])
            .collect()
    }

    pub fn row(&self, tag: &str) -> Option<&RankedRow> {
        self.rows.iter().find(|r| r.tag == tag)
    }
}

/// Both ranked views of one season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonView {
    pub fame: RankedTable,
    pub decks_used: RankedTable,
}

impl SeasonView {
    pub fn from_season(season: &SeasonAccumulator) -> Self {
        Self {
            fame: RankedTable::from_season(season, Metric::Fame),
            decks_used: RankedTable::from_season(season, Metric::DecksUsed),
        }
    }

    pub fn table(&self, metric: Metric) -> &RankedTable {
        match metric {
            Metric::Fame => &self.fame,
            Metric::DecksUsed => &self.decks_used,
        }
    }
}

#[derive(Debug)]
pub enum QueryError {
    /// Storage is reachable but holds nothing for this clan
    NoData(String),
    Storage(StoreError),
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        QueryError::Storage(err)
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::NoData(clan) => write!(f, "No data for clan {}", clan),
            QueryError::Storage(e) => write!(f, "Storage unreachable: {}", e),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::NoData(_) => None,
            QueryError::Storage(e) => Some(e),
        }
    }
}

/// Read path over the season documents
pub struct QueryProjector {
    store: Arc<dyn DocumentStore>,
}

impl QueryProjector {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Ranked views for every stored season of `clan`
    pub fn project(&self, clan: &ClanTag) -> Result<BTreeMap<SeasonId, SeasonView>, QueryError> {
        let documents = self.store.find_all(&clan.hashed())?;
        if documents.is_empty() {
            return Err(QueryError::NoData(clan.hashed()));
        }

        Ok(documents
            .iter()
            .map(|doc| (doc.season_id, SeasonView::from_season(&doc.body)))
            .collect())
    }

    /// One stored season document, if present
    pub fn find_season(
        &self,
        clan: &ClanTag,
        season_id: SeasonId,
    ) -> Result<Option<StoredSeasonDocument>, QueryError> {
        Ok(self.store.find_one(&clan.hashed(), season_id)?)
    }

    /// Collection names of every clan with stored data
    pub fn list_clans(&self) -> Result<Vec<String>, QueryError> {
        Ok(self.store.list_collection_names()?)
    }
}

/// Season ids, newest first
pub fn seasons_descending<V>(seasons: &BTreeMap<SeasonId, V>) -> Vec<SeasonId> {
    seasons.keys().rev().copied().collect()
}
