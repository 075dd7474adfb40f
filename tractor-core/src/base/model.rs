//! Interface of the learned model.
use super::Observation;
use anyhow::Result;
use std::path::Path;

/// Raw model output, `[acceleration, steering, brake]` before clamping.
pub type ActionValues = [f32; 3];

/// A learned function from observations to action values.
///
/// The network architecture and the gradient computation are behind this trait;
/// the rest of the library only predicts and fits.
pub trait QModel {
    /// Predicts the action values of a single observation.
    fn predict(&self, obs: &Observation) -> Result<ActionValues>;

    /// Predicts the action values of a batch of observations.
    fn predict_batch(&self, obs: &[Observation]) -> Result<Vec<ActionValues>> {
        obs.iter().map(|o| self.predict(o)).collect()
    }

    /// Performs one pass of supervised training towards `targets` and returns the loss.
    fn fit(&mut self, states: &[Observation], targets: &[ActionValues]) -> Result<f32>;

    /// Writes the model artifact to `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Reads the model artifact from `path`.
    fn load(&mut self, path: &Path) -> Result<()>;
}
