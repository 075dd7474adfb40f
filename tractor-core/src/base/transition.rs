//! Transition.
use super::{Action, Observation};

/// One step of experience, `(state, action, reward, next_state, done)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Observation the action was chosen from.
    pub state: Observation,

    /// Action sent to the simulator.
    pub action: Action,

    /// Reward returned for the action.
    pub reward: f32,

    /// Observation after the action.
    pub next_state: Observation,

    /// Whether `next_state` is terminal.
    pub done: bool,
}

impl Transition {
    /// Creates a transition.
    pub fn new(
        state: Observation,
        action: Action,
        reward: f32,
        next_state: Observation,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}
