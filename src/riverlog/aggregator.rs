//! Fold a raw river race log into per-season, per-player section totals
//!
//! Pure transformation: no network or storage access. The whole log is
//! parsed before anything is folded, so a malformed payload yields an error
//! and no partial `SeasonMap`.

use super::types::{ClanTag, RawLogItem, RiverRaceLog, SeasonMap, SeasonId, SectionIndex};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug)]
pub enum AggregateError {
    /// Payload does not have the expected shape (missing keys, wrong types)
    Malformed(serde_json::Error),
    /// The target clan's standing carries no `participants` list
    MissingParticipants {
        season_id: SeasonId,
        section_index: SectionIndex,
    },
}

impl From<serde_json::Error> for AggregateError {
    fn from(err: serde_json::Error) -> Self {
        AggregateError::Malformed(err)
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::Malformed(e) => write!(f, "Malformed river race log: {}", e),
            AggregateError::MissingParticipants {
                season_id,
                section_index,
            } => write!(
                f,
                "Malformed river race log: no participants for season {} section {}",
                season_id, section_index
            ),
        }
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AggregateError::Malformed(e) => Some(e),
            AggregateError::MissingParticipants { .. } => None,
        }
    }
}

/// Parse `raw` and aggregate the participants of `clan`
pub fn aggregate(raw: &Value, clan: &ClanTag) -> Result<SeasonMap, AggregateError> {
    let log = RiverRaceLog::deserialize(raw)?;
    aggregate_log(&log, clan)
}

/// Aggregate an already-parsed log
///
/// For every item, only the standing whose clan tag equals `clan` is read.
/// Each participant's `fame` / `decksUsed` is added into the counters for the
/// item's section; the player's name is overwritten on every sighting, so the
/// last item in log order decides it. Seasons where the clan never appears
/// produce no entry.
pub fn aggregate_log(log: &RiverRaceLog, clan: &ClanTag) -> Result<SeasonMap, AggregateError> {
    let target = clan.hashed();
    let mut seasons = SeasonMap::new();

    for item in &log.items {
        fold_item(&mut seasons, item, &target)?;
    }

    log::debug!(
        "Aggregated {} items for {} into {} seasons",
        log.items.len(),
        target,
        seasons.len()
    );

    Ok(seasons)
}

fn fold_item(seasons: &mut SeasonMap, item: &RawLogItem, target: &str) -> Result<(), AggregateError> {
    let Some(standing) = item.standings.iter().find(|s| s.clan.tag == target) else {
        log::debug!(
            "Season {} section {}: {} not in standings, skipping",
            item.season_id,
            item.section_index,
            target
        );
        return Ok(());
    };

    let participants = standing.clan.participants.as_ref().ok_or_else(|| {
        AggregateError::MissingParticipants {
            season_id: item.season_id,
            section_index: item.section_index,
        }
    })?;

    if participants.is_empty() {
        return Ok(());
    }

    let season = seasons.entry(item.season_id).or_default();
    for participant in participants {
        let player = season.player_mut(&participant.tag, &participant.name);
        player.name.clone_from(&participant.name);
        player.add(item.section_index, participant.fame, participant.decks_used);
    }

    Ok(())
}
