//! Agent.
use super::{Policy, ReplayBufferBase};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy.
pub trait Agent<R: ReplayBufferBase>: Policy {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Performs an optimization step with a batch of `batch_size` transitions
    /// taken from `buffer`.
    ///
    /// Returns `Ok(None)` if the agent skipped the step, for example because
    /// it has no model to update.
    fn opt(&mut self, buffer: &mut R, batch_size: usize) -> Result<Option<Record>>;

    /// Called once at the end of every training episode.
    fn end_episode(&mut self);

    /// Current probability of taking an exploratory action.
    fn exploration_rate(&self) -> f64;

    /// Save the parameters of the agent to the given file.
    ///
    /// An agent without learned parameters has nothing to save and succeeds.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given file.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
