use std::time::Duration;

/// Arena configuration
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Wall-clock duration of one round
    pub round_window: Duration,
    /// How long players get to lock in a class before the game starts
    pub class_select_timeout: Duration,
    /// Minimum players required to start a game
    pub min_players: usize,
    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            round_window: Duration::from_secs(30),
            class_select_timeout: Duration::from_secs(30),
            min_players: 2,
            seed: None,
        }
    }
}

impl ArenaConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(secs) = std::env::var("ROUND_WINDOW_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                if parsed > 0 {
                    config.round_window = Duration::from_secs(parsed);
                } else {
                    tracing::warn!("ROUND_WINDOW_SECS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid ROUND_WINDOW_SECS '{}', using default", secs);
            }
        }

        if let Ok(secs) = std::env::var("CLASS_SELECT_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                config.class_select_timeout = Duration::from_secs(parsed);
            } else {
                tracing::warn!("Invalid CLASS_SELECT_TIMEOUT_SECS '{}', using default", secs);
            }
        }

        if let Ok(min) = std::env::var("MIN_PLAYERS") {
            if let Ok(parsed) = min.parse::<usize>() {
                if parsed >= 2 {
                    config.min_players = parsed;
                } else {
                    tracing::warn!("MIN_PLAYERS must be >= 2, using default");
                }
            } else {
                tracing::warn!("Invalid MIN_PLAYERS '{}', using default", min);
            }
        }

        if let Ok(seed) = std::env::var("ARENA_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid ARENA_SEED '{}', ignoring", seed);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.round_window.is_zero() {
            return Err("round_window cannot be zero".to_string());
        }
        if self.min_players < 2 {
            return Err("min_players must be at least 2".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArenaConfig::default();
        assert_eq!(config.round_window, Duration::from_secs(30));
        assert_eq!(config.min_players, 2);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let mut config = ArenaConfig::default();
        config.min_players = 1;
        assert!(config.validate().is_err());

        let mut config = ArenaConfig::default();
        config.round_window = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
