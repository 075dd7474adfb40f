use crate::{mlp::MlpConfig, opt::OptimizerConfig, Device};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
/// Configuration of [`MlpModel`](super::MlpModel).
pub struct MlpModelConfig {
    /// Architecture of the network.
    pub mlp: MlpConfig,

    /// Optimizer.
    pub opt: OptimizerConfig,

    /// Device on which the parameters live.
    pub device: Device,
}

impl MlpModelConfig {
    /// Sets the architecture.
    pub fn mlp(mut self, v: MlpConfig) -> Self {
        self.mlp = v;
        self
    }

    /// Sets the optimizer.
    pub fn opt(mut self, v: OptimizerConfig) -> Self {
        self.opt = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`MlpModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MlpModelConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
