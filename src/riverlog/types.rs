//! Raw river race log payload and the accumulators it is folded into
//!
//! ## Storage format
//!
//! A `PlayerAccumulator` is stored as a flat JSON object so older documents
//! and external tooling keep working:
//!
//! ```json
//! { "name": "Alice", "1_fame": 900, "1_decks_used": 16, "2_fame": 450, "2_decks_used": 8 }
//! ```
//!
//! In memory the per-section counters live in an explicit
//! `section → SectionTotals` map. Keys that are neither `name` nor a section
//! counter are kept verbatim in `extra` so a merge never drops them.

use serde::{
    de::{self, Deserializer},
    ser::{SerializeMap, Serializer},
    Deserialize, Serialize,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type SeasonId = u32;
pub type SectionIndex = u32;

/// Aggregation output for one run: season → accumulator
pub type SeasonMap = BTreeMap<SeasonId, SeasonAccumulator>;

const FAME_SUFFIX: &str = "_fame";
const DECKS_USED_SUFFIX: &str = "_decks_used";

// ── Clan tag ───────────────────────────────────────────────────

/// Clan identifier, accepted with or without the leading `#`
///
/// Held in bare form (`"2PP"`). The API URL uses the bare form behind an
/// encoded `%23`; standings and collection names use the `#`-prefixed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClanTag(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidClanTag(pub String);

impl fmt::Display for InvalidClanTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid clan tag: {:?}", self.0)
    }
}

impl std::error::Error for InvalidClanTag {}

impl ClanTag {
    /// Tag without the leading `#`
    pub fn bare(&self) -> &str {
        &self.0
    }

    /// Tag with the leading `#`, as it appears in standings and collection names
    pub fn hashed(&self) -> String {
        format!("#{}", self.0)
    }
}

impl FromStr for ClanTag {
    type Err = InvalidClanTag;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let bare = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidClanTag(raw.to_string()));
        }

        Ok(Self(bare.to_string()))
    }
}

impl fmt::Display for ClanTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Raw API payload ────────────────────────────────────────────

/// `GET /clans/%23{tag}/riverracelog` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverRaceLog {
    pub items: Vec<RawLogItem>,
}

/// One reporting period (a section of a season)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogItem {
    pub season_id: SeasonId,
    pub section_index: SectionIndex,
    pub standings: Vec<Standing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    pub clan: StandingClan,
}

/// Clan snapshot inside a standing
///
/// `participants` is only required for the clan being aggregated; other
/// clans in the same item are never inspected beyond their tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingClan {
    pub tag: String,
    #[serde(default)]
    pub participants: Option<Vec<Participant>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub tag: String,
    pub name: String,
    pub fame: u64,
    pub decks_used: u64,
}

// ── Accumulators ───────────────────────────────────────────────

/// Counters for one (player, section) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionTotals {
    pub fame: u64,
    pub decks_used: u64,
}

/// Per-player running totals within one season
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAccumulator {
    /// Last-seen display name
    pub name: String,
    pub sections: BTreeMap<SectionIndex, SectionTotals>,
    /// Stored fields that are not section counters
    pub extra: BTreeMap<String, Value>,
}

/// All players of one season
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonAccumulator {
    pub players: BTreeMap<String, PlayerAccumulator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionField {
    Fame,
    DecksUsed,
}

pub fn fame_key(section: SectionIndex) -> String {
    format!("{}{}", section, FAME_SUFFIX)
}

pub fn decks_used_key(section: SectionIndex) -> String {
    format!("{}{}", section, DECKS_USED_SUFFIX)
}

/// Split `"{section}_fame"` / `"{section}_decks_used"` into its parts
fn parse_section_key(key: &str) -> Option<(SectionIndex, SectionField)> {
    let (prefix, field) = if let Some(prefix) = key.strip_suffix(DECKS_USED_SUFFIX) {
        (prefix, SectionField::DecksUsed)
    } else if let Some(prefix) = key.strip_suffix(FAME_SUFFIX) {
        (prefix, SectionField::Fame)
    } else {
        return None;
    };

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    prefix.parse().ok().map(|section| (section, field))
}

/// Read a stored counter; integral doubles are accepted for documents
/// written by other tools.
fn as_count(key: &str, value: &Value) -> Result<u64, String> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(format!("field `{}` is not a non-negative integer: {}", key, value)),
    }
}

impl PlayerAccumulator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Counters for `section`, zero-initialised on first touch
    pub fn section_mut(&mut self, section: SectionIndex) -> &mut SectionTotals {
        self.sections.entry(section).or_default()
    }

    /// Add one participant record into `section`
    pub fn add(&mut self, section: SectionIndex, fame: u64, decks_used: u64) {
        let totals = self.section_mut(section);
        totals.fame = totals.fame.saturating_add(fame);
        totals.decks_used = totals.decks_used.saturating_add(decks_used);
    }

    /// Fill fields missing here from a previously stored record
    ///
    /// Values already present on `self` win; sections and extra keys that
    /// only `existing` carries are copied over.
    pub fn backfill_from(&mut self, existing: &PlayerAccumulator) {
        for (section, totals) in &existing.sections {
            self.sections.entry(*section).or_insert(*totals);
        }
        for (key, value) in &existing.extra {
            self.extra.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    pub fn total(&self, metric_of: impl Fn(&SectionTotals) -> u64) -> u64 {
        self.sections.values().map(metric_of).sum()
    }

    fn from_fields(fields: BTreeMap<String, Value>) -> Result<Self, String> {
        let mut name = None;
        let mut sections: BTreeMap<SectionIndex, SectionTotals> = BTreeMap::new();
        let mut extra = BTreeMap::new();

        for (key, value) in fields {
            if key == "name" {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("field `name` is not a string: {}", value))?;
                name = Some(s.to_string());
                continue;
            }

            match parse_section_key(&key) {
                // A lone `_fame` or `_decks_used` gets its partner zero-filled
                Some((section, SectionField::Fame)) => {
                    sections.entry(section).or_default().fame = as_count(&key, &value)?;
                }
                Some((section, SectionField::DecksUsed)) => {
                    sections.entry(section).or_default().decks_used = as_count(&key, &value)?;
                }
                None => {
                    extra.insert(key, value);
                }
            }
        }

        Ok(Self {
            name: name.ok_or("missing field `name`")?,
            sections,
            extra,
        })
    }
}

impl Serialize for PlayerAccumulator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 1 + self.sections.len() * 2 + self.extra.len();
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("name", &self.name)?;
        for (section, totals) in &self.sections {
            map.serialize_entry(&fame_key(*section), &totals.fame)?;
            map.serialize_entry(&decks_used_key(*section), &totals.decks_used)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PlayerAccumulator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(de::Error::custom)
    }
}

impl SeasonAccumulator {
    /// Player entry, created with `name` if this is the first sighting
    pub fn player_mut(&mut self, tag: &str, name: &str) -> &mut PlayerAccumulator {
        self.players
            .entry(tag.to_string())
            .or_insert_with(|| PlayerAccumulator::new(name))
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
