#![warn(missing_docs)]
//! The learned model of the tractor agent, implemented with
//! [candle](https://crates.io/crates/candle-core).
//!
//! [`MlpModel`] is a multilayer perceptron regressing the three action values
//! from an observation. It implements [`QModel`](tractor_core::QModel), so the
//! rest of the system only predicts and fits.
pub mod mlp;
pub mod model;
pub mod opt;
pub use model::{MlpModel, MlpModelConfig};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    #[default]
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
