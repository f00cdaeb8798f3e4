//! TOML-based application configuration.
//!
//! Stores user preferences for reminders, the outbox capacity, and the
//! background sweep cadence. Stored at `~/.config/cooloff/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::notify::ReminderPrefs;

/// Reminder preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub daily_reminder: bool,
    #[serde(default = "default_true")]
    pub milestones: bool,
    #[serde(default = "default_true")]
    pub checkpoint_warnings: bool,
    /// Preferred local reminder time, hour component (0-23).
    #[serde(default = "default_preferred_hour")]
    pub preferred_hour: u32,
    /// Preferred local reminder time, minute component (0-59).
    #[serde(default)]
    pub preferred_minute: u32,
}

impl RemindersConfig {
    /// Build planner preferences. Authorization is a runtime fact reported
    /// by the delivery system, not a stored preference.
    pub fn to_prefs(&self, authorized: bool) -> ReminderPrefs {
        ReminderPrefs {
            enabled: self.enabled,
            authorized,
            daily_reminder: self.daily_reminder,
            milestones: self.milestones,
            checkpoint_warnings: self.checkpoint_warnings,
            preferred_hour: self.preferred_hour,
            preferred_minute: self.preferred_minute,
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_reminder: true,
            milestones: true,
            checkpoint_warnings: true,
            preferred_hour: default_preferred_hour(),
            preferred_minute: 0,
        }
    }
}

/// Outbox configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxConfig {
    #[serde(default = "default_outbox_capacity")]
    pub capacity: usize,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            capacity: default_outbox_capacity(),
        }
    }
}

/// Background sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/cooloff/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub outbox: OutboxConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl Config {
    pub fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, falling back to defaults when the file is missing.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_preferred_hour() -> u32 {
    19
}
fn default_outbox_capacity() -> usize {
    256
}
fn default_sweep_interval() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.reminders.enabled);
        assert_eq!(config.reminders.preferred_hour, 19);
        assert_eq!(config.outbox.capacity, 256);
        assert_eq!(config.sweep.interval_secs, 300);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str("[reminders]\npreferred_hour = 8\n").unwrap();
        assert_eq!(config.reminders.preferred_hour, 8);
        assert!(config.reminders.daily_reminder);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.reminders.enabled = false;
        config.outbox.capacity = 32;
        let raw = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&raw).unwrap();
        assert!(!back.reminders.enabled);
        assert_eq!(back.outbox.capacity, 32);
    }
}
