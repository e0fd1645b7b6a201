//! UI state: clan and season selection, loaded views, status line
//!
//! Kept free of terminal I/O so selection logic can be unit tested.

use crate::query::{seasons_descending, SeasonView};
use crate::riverlog::{ClanTag, SeasonId};
use crossterm::event::KeyCode;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Clans,
    Seasons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

/// What the event loop must do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Selected clan changed; load its seasons
    LoadClan,
    /// Run fetch + merge for the selected clan, then reload
    Refresh,
    /// Re-read clans and seasons from storage
    Reload,
}

pub struct App {
    pub clans: Vec<String>,
    pub selected_clan: Option<usize>,
    pub seasons: BTreeMap<SeasonId, SeasonView>,
    /// Newest first
    pub season_ids: Vec<SeasonId>,
    pub selected_season: Option<usize>,
    pub focus: Focus,
    pub status: Status,
}

impl App {
    pub fn new(clans: Vec<String>) -> Self {
        let selected_clan = if clans.is_empty() { None } else { Some(0) };
        Self {
            clans,
            selected_clan,
            seasons: BTreeMap::new(),
            season_ids: Vec::new(),
            selected_season: None,
            focus: Focus::Clans,
            status: Status {
                kind: StatusKind::Info,
                text: "Select a clan".to_string(),
            },
        }
    }

    /// Replace the clan list, keeping the current clan selected if still listed
    pub fn set_clans(&mut self, clans: Vec<String>) {
        let current = self.selected_clan_name().map(str::to_string);
        self.clans = clans;
        self.selected_clan = current
            .and_then(|name| self.clans.iter().position(|c| *c == name))
            .or(if self.clans.is_empty() { None } else { Some(0) });
    }

    pub fn selected_clan_name(&self) -> Option<&str> {
        self.selected_clan
            .and_then(|i| self.clans.get(i))
            .map(String::as_str)
    }

    pub fn selected_clan_tag(&self) -> Option<ClanTag> {
        self.selected_clan_name().and_then(|name| name.parse().ok())
    }

    /// Install freshly projected seasons, keeping the selected season if present
    pub fn set_seasons(&mut self, seasons: BTreeMap<SeasonId, SeasonView>) {
        let current = self.selected_season_id();
        self.season_ids = seasons_descending(&seasons);
        self.seasons = seasons;
        self.selected_season = current
            .and_then(|id| self.season_ids.iter().position(|s| *s == id))
            .or(if self.season_ids.is_empty() { None } else { Some(0) });
    }

    pub fn clear_seasons(&mut self) {
        self.seasons.clear();
        self.season_ids.clear();
        self.selected_season = None;
    }

    pub fn selected_season_id(&self) -> Option<SeasonId> {
        self.selected_season.and_then(|i| self.season_ids.get(i).copied())
    }

    pub fn current_view(&self) -> Option<(SeasonId, &SeasonView)> {
        let id = self.selected_season_id()?;
        self.seasons.get(&id).map(|view| (id, view))
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Status {
            kind,
            text: text.into(),
        };
    }

    pub fn on_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('u') | KeyCode::Char('U') => {
                if self.selected_clan.is_some() {
                    Action::Refresh
                } else {
                    Action::None
                }
            }
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.focus = match self.focus {
                    Focus::Clans => Focus::Seasons,
                    Focus::Seasons => Focus::Clans,
                };
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => self.step(1),
            KeyCode::Up | KeyCode::Char('k') => self.step(-1),
            _ => Action::None,
        }
    }

    fn step(&mut self, delta: isize) -> Action {
        match self.focus {
            Focus::Clans => {
                let before = self.selected_clan;
                self.selected_clan = step_index(self.selected_clan, self.clans.len(), delta);
                if self.selected_clan != before {
                    self.clear_seasons();
                    Action::LoadClan
                } else {
                    Action::None
                }
            }
            Focus::Seasons => {
                self.selected_season =
                    step_index(self.selected_season, self.season_ids.len(), delta);
                Action::None
            }
        }
    }
}

/// Move a list selection by `delta`, clamped to the list bounds
fn step_index(current: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.unwrap_or(0) as isize;
    Some((current + delta).clamp(0, len as isize - 1) as usize)
}
