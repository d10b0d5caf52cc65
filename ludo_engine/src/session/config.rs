//! Session configuration models.

use serde::{Deserialize, Serialize};

use crate::game::{Chips, GameSettings, constants::DEFAULT_TIME_LIMIT_SECS};

/// Configuration shared by every session a manager spawns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Match clock in seconds (default: 900)
    pub time_limit_secs: u32,

    /// Stakes a match may be created with, in cents (0 is a practice match)
    pub allowed_stakes: Vec<Chips>,

    /// House cut of the pot in basis points
    pub rake_bps: u16,

    /// Capacity of each session actor's inbox
    pub inbox_capacity: usize,

    /// Seconds between clock ticks
    pub tick_interval_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            allowed_stakes: vec![0, 50, 100, 200],
            rake_bps: 0,
            inbox_capacity: 100,
            tick_interval_secs: 1,
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_secs == 0 {
            return Err("Time limit must be greater than 0".to_string());
        }

        if self.allowed_stakes.is_empty() {
            return Err("At least one stake must be allowed".to_string());
        }

        if self.allowed_stakes.iter().any(|&s| s < 0) {
            return Err("Stakes must not be negative".to_string());
        }

        if self.rake_bps > 10_000 {
            return Err("Rake must be between 0 and 10,000 basis points".to_string());
        }

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be greater than 0".to_string());
        }

        if self.tick_interval_secs == 0 {
            return Err("Tick interval must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn allows_stake(&self, stake: Chips) -> bool {
        self.allowed_stakes.contains(&stake)
    }

    /// Engine settings for a match created under this config
    pub fn game_settings(&self) -> GameSettings {
        GameSettings::new(self.time_limit_secs, self.rake_bps)
    }
}
