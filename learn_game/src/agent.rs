use crate::board::{Action, Mark, StateKey};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::q_table::QTable;
use crate::store::PolicyStore;
use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

/// Epsilon-greedy tabular learner. Owns its Q-table and the store it came from.
#[derive(Debug)]
pub struct Agent {
    config: AgentConfig,
    q: QTable,
    store: PolicyStore,
    rng: StdRng,
}

impl Agent {
    /// Validates `config` and loads the table from `store` right away.
    pub fn new(config: AgentConfig, store: PolicyStore) -> Result<Self, AgentError> {
        config.validate()?;
        let q = store.load()?;
        Ok(Agent {
            config,
            q,
            store,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
    pub fn q_table(&self) -> &QTable {
        &self.q
    }
    pub fn value(&self, state: &StateKey, action: Action) -> f64 {
        self.q.value(state, action)
    }

    /// Random legal action with probability epsilon, otherwise the first best one.
    pub fn choose_action(
        &mut self,
        state: &StateKey,
        legal_actions: &[Action],
    ) -> Result<Action, AgentError> {
        if legal_actions.is_empty() {
            return Err(AgentError::NoLegalActions);
        }
        let n: f64 = self.rng.gen();
        let action = if n < self.config.exploration_rate {
            *legal_actions
                .choose(&mut self.rng)
                .ok_or(AgentError::NoLegalActions)?
        } else {
            self.q
                .max_move(state, legal_actions)
                .ok_or(AgentError::NoLegalActions)?
        };
        log::debug!("state {state:?}: chose {action:?} (roll {n:.3})");
        Ok(action)
    }

    pub fn update_value(
        &mut self,
        state: &StateKey,
        action: Action,
        reward: f64,
        next_state: &StateKey,
        next_legal_actions: &[Action],
    ) -> Result<(), AgentError> {
        if !state.is_well_formed() || state.cell(action) != Some(Mark::Empty) {
            return Err(AgentError::IllegalAction {
                action,
                state: state.clone(),
            });
        }
        let value = self.q.updated_value(
            state,
            action,
            reward,
            next_state,
            next_legal_actions,
            self.config.learning_rate,
            self.config.discount_rate,
        );
        if !value.is_finite() {
            return Err(AgentError::NonFiniteValue { reward, value });
        }
        self.q.set(state.clone(), action, value);
        log::debug!("Q({state:?}, {action:?}) <- {value:.4} (reward {reward})");
        Ok(())
    }

    pub fn save(&self) -> Result<(), AgentError> {
        Ok(self.store.save(&self.q)?)
    }

    pub fn archive(&self, dir: &Path) -> Result<PathBuf, AgentError> {
        Ok(self.store.archive(dir, &self.q)?)
    }
}
