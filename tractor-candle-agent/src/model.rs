//! Q-value regressor of the tractor agent.
mod base;
mod config;
pub use base::MlpModel;
pub use config::MlpModelConfig;
