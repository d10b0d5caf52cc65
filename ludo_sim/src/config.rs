//! Simulator configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use ludo_engine::{Chips, SessionConfig};

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub games: Option<usize>,
    pub players: Option<usize>,
    pub stake: Option<Chips>,
    pub max_moves: Option<usize>,
}

/// Complete simulator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Matches to play concurrently
    pub games: usize,
    /// Seats per match (2 or 4)
    pub players: usize,
    /// Bet per player in cents
    pub stake: Chips,
    /// Moves after which a match is ended early
    pub max_moves: usize,
    /// Settings for the session manager
    pub session: SessionConfig,
}

impl SimConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI args
    ///
    /// # Returns
    ///
    /// * `SimConfig` - Loaded configuration; call [`SimConfig::validate`] before use
    pub fn from_env(overrides: Overrides) -> Self {
        let defaults = SessionConfig::default();
        let session = SessionConfig {
            time_limit_secs: parse_env_or("LUDO_TIME_LIMIT_SECS", defaults.time_limit_secs),
            rake_bps: parse_env_or("LUDO_RAKE_BPS", defaults.rake_bps),
            ..defaults
        };

        SimConfig {
            games: overrides
                .games
                .unwrap_or_else(|| parse_env_or("LUDO_GAMES", 1)),
            players: overrides
                .players
                .unwrap_or_else(|| parse_env_or("LUDO_PLAYERS", 2)),
            stake: overrides
                .stake
                .unwrap_or_else(|| parse_env_or("LUDO_STAKE", 0)),
            max_moves: overrides
                .max_moves
                .unwrap_or_else(|| parse_env_or("LUDO_MAX_MOVES", 500)),
            session,
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.games == 0 {
            return Err(ConfigError::Invalid {
                var: "LUDO_GAMES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.players != 2 && self.players != 4 {
            return Err(ConfigError::Invalid {
                var: "LUDO_PLAYERS".to_string(),
                reason: format!("Must be 2 or 4, got {}", self.players),
            });
        }

        if !self.session.allows_stake(self.stake) {
            return Err(ConfigError::Invalid {
                var: "LUDO_STAKE".to_string(),
                reason: format!(
                    "Must be one of {:?} cents",
                    self.session.allowed_stakes
                ),
            });
        }

        if self.max_moves == 0 {
            return Err(ConfigError::Invalid {
                var: "LUDO_MAX_MOVES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        self.session
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "LUDO_TIME_LIMIT_SECS/LUDO_RAKE_BPS".to_string(),
                reason,
            })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 6] = [
        "LUDO_GAMES",
        "LUDO_PLAYERS",
        "LUDO_STAKE",
        "LUDO_MAX_MOVES",
        "LUDO_TIME_LIMIT_SECS",
        "LUDO_RAKE_BPS",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: tests touching the environment are #[serial].
            unsafe { env::remove_var(var) };
        }
    }

    fn valid_config() -> SimConfig {
        SimConfig {
            games: 1,
            players: 2,
            stake: 0,
            max_moves: 100,
            session: SessionConfig::default(),
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = SimConfig::from_env(Overrides::default());
        assert_eq!(config.games, 1);
        assert_eq!(config.players, 2);
        assert_eq!(config.stake, 0);
        assert_eq!(config.max_moves, 500);
        assert_eq!(config.session, SessionConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_and_overrides() {
        clear_env();
        // SAFETY: tests touching the environment are #[serial].
        unsafe {
            env::set_var("LUDO_GAMES", "8");
            env::set_var("LUDO_PLAYERS", "4");
            env::set_var("LUDO_RAKE_BPS", "250");
            env::set_var("LUDO_STAKE", "not-a-number");
        }

        let config = SimConfig::from_env(Overrides {
            players: Some(2),
            ..Overrides::default()
        });
        assert_eq!(config.games, 8);
        assert_eq!(config.players, 2);
        assert_eq!(config.stake, 0);
        assert_eq!(config.session.rake_bps, 250);

        clear_env();
    }

    #[test]
    fn test_validation_player_count() {
        let config = SimConfig {
            players: 3,
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("LUDO_PLAYERS"));
    }

    #[test]
    fn test_validation_stake() {
        let config = SimConfig {
            stake: 75,
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { var, .. }) if var == "LUDO_STAKE"
        ));
    }

    #[test]
    fn test_validation_session() {
        let mut config = valid_config();
        config.session.rake_bps = 20_000;
        assert!(config.validate().is_err());
    }
}
