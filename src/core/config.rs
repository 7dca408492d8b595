/// Game configuration: bust sequence timings, autosave cadence and login
/// limits. Every field has a default, so a config file only needs the
/// values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Phase durations of the bust sequence, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    /// Delay between investigating the target and entering EQUIPPED.
    pub arming_delay_ms: u64,
    pub equipped_ms: u64,
    pub busted_ms: u64,
    pub jailed_ms: u64,
    pub released_ms: u64,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            arming_delay_ms: 2000,
            equipped_ms: 5000,
            busted_ms: 6000,
            jailed_ms: 3000,
            released_ms: 2000,
        }
    }
}

impl PhaseTimings {
    pub fn arming_delay(&self) -> Duration {
        Duration::from_millis(self.arming_delay_ms)
    }

    pub fn equipped(&self) -> Duration {
        Duration::from_millis(self.equipped_ms)
    }

    pub fn busted(&self) -> Duration {
        Duration::from_millis(self.busted_ms)
    }

    pub fn jailed(&self) -> Duration {
        Duration::from_millis(self.jailed_ms)
    }

    pub fn released(&self) -> Duration {
        Duration::from_millis(self.released_ms)
    }

    /// Time from the target's `investigate` to the next IDLE.
    pub fn total(&self) -> Duration {
        self.arming_delay() + self.equipped() + self.busted() + self.jailed() + self.released()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("timings.arming_delay_ms", self.arming_delay_ms),
            ("timings.equipped_ms", self.equipped_ms),
            ("timings.busted_ms", self.busted_ms),
            ("timings.jailed_ms", self.jailed_ms),
            ("timings.released_ms", self.released_ms),
        ];
        match fields.into_iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::Zero(name)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub timings: PhaseTimings,
    pub autosave_interval_ms: u64,
    pub max_username_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            timings: PhaseTimings::default(),
            autosave_interval_ms: 30_000,
            max_username_len: 20,
        }
    }
}

impl GameConfig {
    pub fn load_from_ron(path: &Path) -> Result<GameConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<GameConfig, ConfigError> {
        let config: GameConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timings.validate()?;
        if self.autosave_interval_ms == 0 {
            return Err(ConfigError::Zero("autosave_interval_ms"));
        }
        if self.max_username_len == 0 {
            return Err(ConfigError::Zero("max_username_len"));
        }
        Ok(())
    }
}
