use super::{mlp_forward, MlpConfig};
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::{linear, Linear, VarBuilder};

/// Returns vector of linear modules from [`MlpConfig`].
fn create_linear_layers(prefix: &str, vs: VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    let dims: Vec<usize> = std::iter::once(config.in_dim)
        .chain(config.units.iter().copied())
        .chain(std::iter::once(config.out_dim))
        .collect();
    let vs = vs.pp(prefix);

    let mut layers = Vec::with_capacity(dims.len() - 1);
    for (i, pair) in dims.windows(2).enumerate() {
        layers.push(linear(pair[0], pair[1], vs.pp(format!("ln{}", i)))?);
    }
    Ok(layers)
}

/// Multilayer perceptron with ReLU activation function.
pub struct Mlp {
    config: MlpConfig,
    layers: Vec<Linear>,
}

impl Mlp {
    /// Constructs the layers, registering their parameters in `vs`.
    pub fn build(vs: VarBuilder, config: MlpConfig) -> Result<Self> {
        let layers = create_linear_layers("mlp", vs, &config)?;
        Ok(Self { config, layers })
    }

    /// Maps a batch of shape `(n, in_dim)` to `(n, out_dim)`.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(mlp_forward(xs.clone(), &self.layers)?)
    }

    /// Configuration of the network.
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }
}
