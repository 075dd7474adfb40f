use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    /// Number of input features.
    pub in_dim: usize,

    /// Widths of the hidden layers.
    pub units: Vec<usize>,

    /// Number of outputs.
    pub out_dim: usize,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self::new(7, vec![24, 24], 3)
    }
}

impl MlpConfig {
    /// Creates configuration of MLP.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
        }
    }
}
