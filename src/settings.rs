//! Host settings and preferences
//!
//! Persisted separately from progression under the `settings` key. The
//! engine itself never reads these; they steer the host loop.

use serde::{Deserialize, Serialize};

use crate::sim::Difficulty;

/// Host preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty offered for new runs
    pub difficulty: Difficulty,
    /// Let the autopilot steer and launch
    pub autopilot: bool,
    /// Advance automatically after a level clear
    pub auto_advance: bool,
    /// Spend currency on upgrades between runs
    pub auto_buy_upgrades: bool,
    /// Stop the headless loop after this many ticks
    pub max_ticks: u64,
    /// Log a progress line every N ticks (0 = never)
    pub report_interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            autopilot: true,
            auto_advance: true,
            auto_buy_upgrades: false,
            max_ticks: 60 * 60 * 10,
            report_interval: 60 * 30,
        }
    }
}

impl Settings {
    /// Whether a progress line is due at `tick`
    pub fn report_due(&self, tick: u64) -> bool {
        self.report_interval > 0 && tick > 0 && tick % self.report_interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"difficulty":"hard"}"#).unwrap();
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert!(settings.autopilot);
        assert_eq!(settings.max_ticks, Settings::default().max_ticks);
    }

    #[test]
    fn test_report_due() {
        let mut settings = Settings {
            report_interval: 100,
            ..Settings::default()
        };
        assert!(!settings.report_due(0));
        assert!(!settings.report_due(99));
        assert!(settings.report_due(200));
        settings.report_interval = 0;
        assert!(!settings.report_due(200));
    }
}
