//! Policy.
use super::{Action, Observation};

/// A policy on the tractor simulator.
///
/// Policy is a mapping from an observation to an action.
/// The mapping can be either of deterministic or stochastic.
pub trait Policy {
    /// Selects an action given an observation.
    ///
    /// The returned action satisfies the ranges of [`Action`].
    fn select_action(&mut self, obs: &Observation) -> Action;
}
