use super::MlpModelConfig;
use crate::{mlp::Mlp, opt::Optimizer};
use anyhow::{anyhow, ensure, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{loss::mse, VarBuilder, VarMap};
use log::info;
use std::path::Path;
use tractor_core::{ActionValues, Observation, QModel};

/// Multilayer perceptron fitted with mean squared error.
///
/// The parameters are stored as safetensors by [`QModel::save`].
pub struct MlpModel {
    device: Device,
    varmap: VarMap,
    mlp: Mlp,
    opt: Optimizer,
}

impl MlpModel {
    /// Constructs the network with freshly initialized parameters.
    pub fn build(config: MlpModelConfig) -> Result<Self> {
        ensure!(
            config.mlp.out_dim == 3,
            "the model must output 3 action values, got out_dim = {}",
            config.mlp.out_dim
        );
        let device: Device = config.device.try_into()?;
        let varmap = VarMap::new();
        let vs = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let mlp = Mlp::build(vs, config.mlp)?;
        let opt = config.opt.build(varmap.all_vars())?;

        Ok(Self {
            device,
            varmap,
            mlp,
            opt,
        })
    }

    fn to_tensor(&self, obs: &[Observation]) -> Result<Tensor> {
        let in_dim = self.mlp.config().in_dim;
        let mut data = Vec::with_capacity(obs.len() * in_dim);
        for o in obs.iter() {
            ensure!(
                o.len() == in_dim,
                "observation has {} features, the model expects {}",
                o.len(),
                in_dim
            );
            data.extend_from_slice(o.as_slice());
        }
        Ok(Tensor::from_vec(data, (obs.len(), in_dim), &self.device)?)
    }

    fn forward(&self, obs: &[Observation]) -> Result<Vec<ActionValues>> {
        if obs.is_empty() {
            return Ok(vec![]);
        }
        let ys = self.mlp.forward(&self.to_tensor(obs)?)?;
        ys.to_vec2::<f32>()?
            .into_iter()
            .map(|row| {
                ActionValues::try_from(row)
                    .map_err(|row| anyhow!("expected 3 outputs, got {}", row.len()))
            })
            .collect()
    }
}

impl QModel for MlpModel {
    fn predict(&self, obs: &Observation) -> Result<ActionValues> {
        self.forward(std::slice::from_ref(obs))?
            .pop()
            .ok_or_else(|| anyhow!("no output for the observation"))
    }

    fn predict_batch(&self, obs: &[Observation]) -> Result<Vec<ActionValues>> {
        self.forward(obs)
    }

    fn fit(&mut self, states: &[Observation], targets: &[ActionValues]) -> Result<f32> {
        ensure!(
            states.len() == targets.len(),
            "{} states but {} targets",
            states.len(),
            targets.len()
        );
        ensure!(!states.is_empty(), "cannot fit an empty batch");

        let xs = self.to_tensor(states)?;
        let ys: Vec<f32> = targets.iter().flatten().copied().collect();
        let ys = Tensor::from_vec(ys, (targets.len(), 3), &self.device)?;

        let loss = mse(&self.mlp.forward(&xs)?, &ys)?;
        self.opt.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.varmap.save(path)?;
        info!("Saved the model parameters to {:?}", path);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        self.varmap.load(path)?;
        info!("Loaded the model parameters from {:?}", path);
        Ok(())
    }
}
