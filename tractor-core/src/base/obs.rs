//! Observation.
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Number of scalar features the simulator reports for the tractor.
pub const OBS_DIM: usize = 7;

/// State of the vehicle and its surroundings at one point in time.
///
/// Observations are produced by the simulator and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observation(Vec<f32>);

impl Observation {
    /// Creates an observation from its features.
    pub fn new(features: Vec<f32>) -> Self {
        Self(features)
    }

    /// An observation with all features set to zero.
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0f32; dim])
    }

    /// Returns the features.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl Deref for Observation {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for Observation {
    fn from(features: Vec<f32>) -> Self {
        Self(features)
    }
}

impl From<Observation> for Vec<f32> {
    fn from(obs: Observation) -> Self {
        obs.0
    }
}
