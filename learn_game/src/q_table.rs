use crate::board::{Action, StateKey};
use std::collections::HashMap;
use std::ops::Deref;

/// Learned value of playing an action in a state. Missing pairs are worth 0.0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QTable {
    qtable: HashMap<(StateKey, Action), f64>,
}

impl Deref for QTable {
    type Target = HashMap<(StateKey, Action), f64>;
    fn deref(&self) -> &<Self as Deref>::Target {
        &self.qtable
    }
}

impl FromIterator<((StateKey, Action), f64)> for QTable {
    fn from_iter<I: IntoIterator<Item = ((StateKey, Action), f64)>>(iter: I) -> Self {
        QTable {
            qtable: iter.into_iter().collect(),
        }
    }
}

impl QTable {
    pub fn new() -> Self {
        QTable {
            qtable: HashMap::with_capacity(11000),
        }
    }
    pub fn value(&self, state: &StateKey, action: Action) -> f64 {
        self.qtable
            .get(&(state.clone(), action))
            .copied()
            .unwrap_or(0.0)
    }
    pub fn set(&mut self, state: StateKey, action: Action, value: f64) {
        self.qtable.insert((state, action), value);
    }
    /// Best value over `actions`, or 0.0 when there are none.
    pub fn max_value(&self, state: &StateKey, actions: &[Action]) -> f64 {
        actions
            .iter()
            .map(|&action| self.value(state, action))
            .fold(None, |best: Option<f64>, value| {
                Some(best.map_or(value, |b| b.max(value)))
            })
            .unwrap_or(0.0)
    }
    /// First action in `actions` holding the highest value.
    pub fn max_move(&self, state: &StateKey, actions: &[Action]) -> Option<Action> {
        actions
            .iter()
            .map(|&action| (action, self.value(state, action)))
            .fold(None, |best: Option<(Action, f64)>, (action, value)| match best {
                Some((_, b)) if value <= b => best,
                _ => Some((action, value)),
            })
            .map(|(action, _)| action)
    }
    /// `Q + lrate * (reward + drate * max_next - Q)`; the table is left as is.
    pub fn updated_value(
        &self,
        state: &StateKey,
        action: Action,
        reward: f64,
        next_state: &StateKey,
        next_actions: &[Action],
        learning_rate: f64,
        discount_rate: f64,
    ) -> f64 {
        let current = self.value(state, action);
        let next_max = self.max_value(next_state, next_actions);
        current + learning_rate * (reward + discount_rate * next_max - current)
    }
}
