//! Multilayer perceptron.
mod base;
mod config;
pub use base::Mlp;
use candle_core::{Module, Result, Tensor};
use candle_nn::Linear;
pub use config::MlpConfig;

/// ReLU between the layers, linear output.
fn mlp_forward(xs: Tensor, layers: &[Linear]) -> Result<Tensor> {
    let n_layers = layers.len();
    let mut xs = xs;

    for (i, layer) in layers.iter().enumerate() {
        xs = layer.forward(&xs)?;
        if i + 1 < n_layers {
            xs = xs.relu()?;
        }
    }
    Ok(xs)
}
