//! Per-game configuration

use crate::clock::TimeControl;
use crate::opponent::Difficulty;
use serde::{Deserialize, Serialize};

/// Who plays Black: another local human, or the computer opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Local,
    Computer,
}

/// Recognized options for one game. Immutable per game; replaced wholesale
/// between games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub mode: Mode,
    pub time_control: TimeControl,
    pub difficulty: Difficulty,
    pub show_coordinates: bool,
    pub highlight_moves: bool,
    pub highlight_last_move: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mode: Mode::Local,
            time_control: TimeControl::default(),
            difficulty: Difficulty::Intermediate,
            show_coordinates: true,
            highlight_moves: true,
            highlight_last_move: true,
        }
    }
}

/// Partial settings update: absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub mode: Option<Mode>,
    pub time_control: Option<TimeControl>,
    pub difficulty: Option<Difficulty>,
    pub show_coordinates: Option<bool>,
    pub highlight_moves: Option<bool>,
    pub highlight_last_move: Option<bool>,
}

impl Settings {
    /// Applies a partial update, returning whether the time control changed.
    pub fn apply(&mut self, update: SettingsUpdate) -> bool {
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(difficulty) = update.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(v) = update.show_coordinates {
            self.show_coordinates = v;
        }
        if let Some(v) = update.highlight_moves {
            self.highlight_moves = v;
        }
        if let Some(v) = update.highlight_last_move {
            self.highlight_last_move = v;
        }
        match update.time_control {
            Some(tc) if tc != self.time_control => {
                self.time_control = tc;
                true
            }
            _ => false,
        }
    }
}
