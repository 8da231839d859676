use crate::board::{Action, StateKey};
use std::path::PathBuf;

/// Failures while reading or writing the persisted Q-table. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read Q-table from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write Q-table to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode JSON Q-table {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to decode pickle Q-table {path}: {source}")]
    Pickle {
        path: PathBuf,
        source: serde_pickle::Error,
    },

    #[error("unsupported Q-table version {found} in {path} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("invalid record #{index} in {path}: {reason}")]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("no legal actions to choose from")]
    NoLegalActions,

    #[error("action {action:?} is not legal in state {state:?}")]
    IllegalAction { action: Action, state: StateKey },

    #[error("update gave non-finite value {value} (reward {reward})")]
    NonFiniteValue { reward: f64, value: f64 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("square {0:?} is outside the board")]
    OutOfBounds(Action),

    #[error("square {0:?} is already taken")]
    Occupied(Action),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid state key {0:?}")]
pub struct InvalidStateKey(pub String);

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input closed")]
    Closed,

    #[error("gave up after {0} invalid attempts")]
    TooManyAttempts(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_display() {
        let err = StorageError::UnsupportedVersion {
            path: PathBuf::from("qtable.json"),
            found: 7,
            expected: 1,
        };
        assert_eq!(
            err.to_string(),
            "unsupported Q-table version 7 in qtable.json (expected 1)"
        );
    }

    #[test]
    fn move_error_display() {
        assert_eq!(
            MoveError::Occupied((1, 2)).to_string(),
            "square (1, 2) is already taken"
        );
    }

    #[test]
    fn agent_error_wraps_storage() {
        let err: AgentError = StorageError::InvalidRecord {
            path: PathBuf::from("q.json"),
            index: 3,
            reason: "row 5 out of range".to_owned(),
        }
        .into();
        assert_eq!(err.to_string(), "invalid record #3 in q.json: row 5 out of range");
    }

    #[test]
    fn non_finite_value_display() {
        let err = AgentError::NonFiniteValue {
            reward: f64::INFINITY,
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "update gave non-finite value inf (reward inf)");
    }
}
