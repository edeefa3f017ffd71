//! Difficulty profiles and brick row templates

use serde::{Deserialize, Serialize};

use crate::consts::BRICK_COLUMNS;

/// Which columns of a brick row are populated
pub type Pattern = [bool; BRICK_COLUMNS];

const X: bool = true;
const O: bool = false;

/// Single solid row
const SOLID_POOL: &[Pattern] = &[[X, X, X, X, X, X, X, X, X, X]];

/// Full, checkered and split rows
const MIXED_POOL: &[Pattern] = &[
    [X, X, X, X, X, X, X, X, X, X],
    [X, O, X, O, X, O, X, O, X, O],
    [O, X, X, X, O, O, X, X, X, O],
];

/// Mostly filled rows with narrow gaps
const DENSE_POOL: &[Pattern] = &[
    [X, X, X, X, X, X, X, X, X, X],
    [X, X, X, X, O, O, X, X, X, X],
    [X, O, X, X, X, X, X, X, O, X],
    [X, X, O, X, X, X, X, O, X, X],
];

/// Parameters a difficulty feeds into level generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Brick rows per level
    pub rows: usize,
    /// Scales the level-derived base hp
    pub hp_mult: f64,
    /// Scales the extra hp every second row gains
    pub row_bonus_mult: f64,
    /// Probability a placed brick gets one extra hp
    pub extra_hp_chance: f64,
    /// Row templates drawn from per row
    pub patterns: &'static [Pattern],
}

const EASY: DifficultyProfile = DifficultyProfile {
    rows: 4,
    hp_mult: 0.8,
    row_bonus_mult: 0.5,
    extra_hp_chance: 0.05,
    patterns: SOLID_POOL,
};

const NORMAL: DifficultyProfile = DifficultyProfile {
    rows: 5,
    hp_mult: 1.0,
    row_bonus_mult: 1.0,
    extra_hp_chance: 0.1,
    patterns: MIXED_POOL,
};

const HARD: DifficultyProfile = DifficultyProfile {
    rows: 6,
    hp_mult: 1.3,
    row_bonus_mult: 1.5,
    extra_hp_chance: 0.2,
    patterns: DENSE_POOL,
};

/// Difficulty chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn profile(self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Normal => &NORMAL,
            Difficulty::Hard => &HARD,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
