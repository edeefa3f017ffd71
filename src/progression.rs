//! Meta-progression and run records
//!
//! Two tiers of persisted state:
//! - `MetaState`: currency and permanent upgrades, survives every run
//! - `RunState`: seed/level/score/lives/difficulty of the run in progress
//!
//! `ProgressionStore` is the only code that reads or writes the stored
//! bytes. Corrupt records are logged and replaced with defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::*;
use crate::error::{PurchaseError, StoreError};
use crate::persistence::KeyValueStore;
use crate::sim::Difficulty;

/// Storage keys
pub const META_KEY: &str = "meta";
pub const RUN_KEY: &str = "run";
pub const SETTINGS_KEY: &str = "settings";
pub const HIGHSCORES_KEY: &str = "highscores";

const PADDLE_WIDTH_COSTS: &[u64] = &[20, 40, 80];
const EXTRA_LIFE_COSTS: &[u64] = &[50, 100, 200];

/// Permanent upgrades that can be bought with currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKind {
    PaddleWidth,
    ExtraLife,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 2] = [UpgradeKind::PaddleWidth, UpgradeKind::ExtraLife];

    /// Ascending cost of each tier; the length is the max level
    pub fn cost_table(self) -> &'static [u64] {
        match self {
            UpgradeKind::PaddleWidth => PADDLE_WIDTH_COSTS,
            UpgradeKind::ExtraLife => EXTRA_LIFE_COSTS,
        }
    }

    pub fn max_level(self) -> u32 {
        self.cost_table().len() as u32
    }

    /// Cost of the tier after `level`, `None` once exhausted
    pub fn cost_at(self, level: u32) -> Option<u64> {
        self.cost_table().get(level as usize).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::PaddleWidth => "paddleWidth",
            UpgradeKind::ExtraLife => "extraLife",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "paddleWidth" | "paddle_width" | "paddle" => Some(UpgradeKind::PaddleWidth),
            "extraLife" | "extra_life" | "life" => Some(UpgradeKind::ExtraLife),
            _ => None,
        }
    }
}

impl std::fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purchased level of each upgrade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    #[serde(rename = "paddleWidth")]
    pub paddle_width: u32,
    #[serde(rename = "extraLife")]
    pub extra_life: u32,
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::PaddleWidth => self.paddle_width,
            UpgradeKind::ExtraLife => self.extra_life,
        }
    }

    fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::PaddleWidth => &mut self.paddle_width,
            UpgradeKind::ExtraLife => &mut self.extra_life,
        }
    }
}

/// Permanent state carried across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaState {
    pub currency: u64,
    pub upgrades: Upgrades,
}

impl MetaState {
    /// Decode a meta record. Missing or invalid fields become 0, levels
    /// above the cost table are capped.
    pub fn from_value(value: &Value) -> Self {
        let number = |v: Option<&Value>| v.and_then(Value::as_u64).unwrap_or(0);
        let upgrades = value.get("upgrades");
        let level = |kind: UpgradeKind| {
            let raw = number(upgrades.and_then(|u| u.get(kind.as_str())));
            u32::try_from(raw).unwrap_or(u32::MAX).min(kind.max_level())
        };

        Self {
            currency: number(value.get("currency")),
            upgrades: Upgrades {
                paddle_width: level(UpgradeKind::PaddleWidth),
                extra_life: level(UpgradeKind::ExtraLife),
            },
        }
    }

    /// Paddle width a new run starts with
    pub fn paddle_width(&self) -> f32 {
        PADDLE_BASE_WIDTH + PADDLE_WIDTH_PER_LEVEL * self.upgrades.paddle_width as f32
    }

    /// Lives a new run starts with
    pub fn starting_lives(&self) -> u32 {
        BASE_LIVES + self.upgrades.extra_life
    }

    /// Cost of the next tier of `kind`, `None` at max level
    pub fn next_cost(&self, kind: UpgradeKind) -> Option<u64> {
        kind.cost_at(self.upgrades.level(kind))
    }

    pub fn credit(&mut self, amount: u64) {
        self.currency = self.currency.saturating_add(amount);
    }

    /// Buy the next tier of `kind`. Returns the new level.
    ///
    /// On error nothing is changed.
    pub fn purchase(&mut self, kind: UpgradeKind) -> Result<u32, PurchaseError> {
        let cost = self
            .next_cost(kind)
            .ok_or(PurchaseError::MaxLevelReached { kind })?;
        if self.currency < cost {
            return Err(PurchaseError::InsufficientFunds {
                kind,
                cost,
                currency: self.currency,
            });
        }
        self.currency -= cost;
        let level = self.upgrades.level_mut(kind);
        *level += 1;
        Ok(*level)
    }
}

/// The run in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub seed: u32,
    /// 1-based
    pub level: u32,
    pub score: u64,
    pub lives: u32,
    pub difficulty: Difficulty,
}

impl RunState {
    /// Fresh run at level 1
    pub fn new(seed: u32, difficulty: Difficulty, lives: u32) -> Self {
        Self {
            seed,
            level: 1,
            score: 0,
            lives,
            difficulty,
        }
    }
}

/// Reads and writes progression records through a key-value backend
#[derive(Debug)]
pub struct ProgressionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ProgressionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Load the meta record; corrupt or unreadable data yields defaults
    pub fn load_meta(&mut self) -> MetaState {
        match self.read_json::<Value>(META_KEY) {
            Ok(Some(value)) if value.is_object() => MetaState::from_value(&value),
            Ok(Some(_)) => {
                self.recover(StoreError::CorruptPersistedState {
                    key: META_KEY.to_string(),
                    reason: "expected a JSON object".to_string(),
                });
                MetaState::default()
            }
            Ok(None) => MetaState::default(),
            Err(e) => {
                self.recover(e);
                MetaState::default()
            }
        }
    }

    pub fn save_meta(&mut self, meta: &MetaState) {
        self.write_json(META_KEY, meta);
    }

    /// Load the saved run, `None` if absent or corrupt
    pub fn load_run(&mut self) -> Option<RunState> {
        match self.read_json::<RunState>(RUN_KEY) {
            Ok(Some(run)) if run.level >= 1 && run.lives >= 1 => Some(run),
            Ok(Some(run)) => {
                self.recover(StoreError::CorruptPersistedState {
                    key: RUN_KEY.to_string(),
                    reason: format!("invalid level {} or lives {}", run.level, run.lives),
                });
                None
            }
            Ok(None) => None,
            Err(e) => {
                self.recover(e);
                None
            }
        }
    }

    pub fn save_run(&mut self, run: &RunState) {
        self.write_json(RUN_KEY, run);
    }

    pub fn clear_run(&mut self) {
        if let Err(e) = self.backend.remove(RUN_KEY) {
            log::warn!("Failed to clear saved run: {e}");
        }
    }

    /// Load any other record, falling back to `T::default()`
    pub fn load_record<T: DeserializeOwned + Default>(&mut self, key: &str) -> T {
        match self.read_json::<T>(key) {
            Ok(Some(record)) => record,
            Ok(None) => T::default(),
            Err(e) => {
                self.recover(e);
                T::default()
            }
        }
    }

    pub fn save_record<T: Serialize>(&mut self, key: &str, record: &T) {
        self.write_json(key, record);
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::CorruptPersistedState {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn write_json<T: Serialize>(&mut self, key: &str, record: &T) {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to encode '{key}': {e}");
                return;
            }
        };
        match self.backend.set(key, &json) {
            Ok(()) => log::debug!("Saved '{key}' ({} bytes)", json.len()),
            Err(e) => log::warn!("Failed to save '{key}': {e}"),
        }
    }

    /// Log and drop a bad record so the next load starts clean
    fn recover(&mut self, error: StoreError) {
        log::warn!("{error}; resetting to defaults");
        if let StoreError::CorruptPersistedState { key, .. } = &error {
            if let Err(e) = self.backend.remove(key) {
                log::warn!("Failed to drop corrupt '{key}': {e}");
            }
        }
    }
}
