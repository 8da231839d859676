use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const NUM_EPISODES: usize = 50_000_usize;
pub const DEFAULT_TABLE_PATH: &str = "q_table_archive/qtable.json";

/// Hyper-parameters of the learning agent, fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub exploration_rate: f64,
    pub learning_rate: f64,
    pub discount_rate: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            exploration_rate: 0.1,
            learning_rate: 0.5,
            discount_rate: 0.9,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("exploration_rate", self.exploration_rate),
            ("learning_rate", self.learning_rate),
            ("discount_rate", self.discount_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Rewards seen by the agent at the end of a game. Non-terminal moves earn 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    pub win: f64,
    pub loss: f64,
    pub draw: f64,
}

impl Default for Rewards {
    fn default() -> Self {
        Rewards {
            win: 1.0,
            loss: -1.0,
            draw: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: usize,
    pub log_every: usize,
    pub seed: Option<u64>,
    pub archive_dir: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            episodes: NUM_EPISODES,
            log_every: 10_000,
            seed: None,
            archive_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub agent: AgentConfig,
    pub rewards: Rewards,
    pub training: TrainingConfig,
}

impl GameConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = serde_json::from_str(&contents)?;
        config.agent.validate()?;
        Ok(config)
    }
}
