//! Configuration of [`TractorAgent`](super::TractorAgent).
use super::{ExplorationConfig, SteeringConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How the regression targets of a batch are built from the bootstrapped value.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum TargetStrategy {
    /// `r + gamma * max(q_next)` written into all three outputs.
    #[default]
    Uniform,

    /// Output `i` bootstraps from its own next-state prediction, `r + gamma * q_next[i]`.
    PerComponent,
}

/// Action ranges and the thresholds of the forward-biased overrides.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PolicyConfig {
    /// Range of the acceleration of exploratory actions.
    pub explore_acceleration: (f32, f32),

    /// Range of the steering of exploratory actions.
    pub explore_steering: (f32, f32),

    /// Range of the brake of exploratory actions.
    pub explore_brake: (f32, f32),

    /// A model output whose clamped components are all smaller than this in
    /// magnitude is replaced by the default action.
    pub degenerate_threshold: f32,

    /// Acceleration below which the model output is boosted.
    pub accel_floor: f32,

    /// Acceleration set by the boost in training mode.
    pub train_accel_boost: f32,

    /// Acceleration set by the boost in evaluation mode.
    pub eval_accel_boost: f32,

    /// Acceleration of the default and fallback actions.
    pub default_acceleration: f32,

    /// Half width of the steering range of the default action in training mode.
    pub default_steering_spread: f32,

    /// Half width of the steering range of the action used when inference fails.
    pub fallback_steering_spread: f32,

    /// Seed of the random number generator of the policy.
    pub seed: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            explore_acceleration: (0.5, 1.0),
            explore_steering: (-0.8, 0.8),
            explore_brake: (0.0, 0.1),
            degenerate_threshold: 0.1,
            accel_floor: 0.3,
            train_accel_boost: 0.5,
            eval_accel_boost: 0.7,
            default_acceleration: 0.7,
            default_steering_spread: 0.3,
            fallback_steering_spread: 0.8,
            seed: 42,
        }
    }
}

impl PolicyConfig {
    /// Sets the degenerate-output threshold.
    pub fn degenerate_threshold(mut self, v: f32) -> Self {
        self.degenerate_threshold = v;
        self
    }

    /// Sets the acceleration floor.
    pub fn accel_floor(mut self, v: f32) -> Self {
        self.accel_floor = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Configuration of [`TractorAgent`](super::TractorAgent).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct AgentConfig {
    /// Action selection.
    pub policy: PolicyConfig,

    /// Epsilon-greedy exploration.
    pub exploration: ExplorationConfig,

    /// Consecutive-steering heuristic.
    pub steering: SteeringConfig,

    /// Discount factor.
    pub gamma: f32,

    /// Construction of the regression targets.
    pub target_strategy: TargetStrategy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            exploration: ExplorationConfig::default(),
            steering: SteeringConfig::default(),
            gamma: 0.95,
            target_strategy: TargetStrategy::Uniform,
        }
    }
}

impl AgentConfig {
    /// Sets the configuration of the action selection.
    pub fn policy(mut self, v: PolicyConfig) -> Self {
        self.policy = v;
        self
    }

    /// Sets the configuration of the exploration.
    pub fn exploration(mut self, v: ExplorationConfig) -> Self {
        self.exploration = v;
        self
    }

    /// Sets the configuration of the consecutive-steering heuristic.
    pub fn steering(mut self, v: SteeringConfig) -> Self {
        self.steering = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the target strategy.
    pub fn target_strategy(mut self, v: TargetStrategy) -> Self {
        self.target_strategy = v;
        self
    }

    /// Constructs [`AgentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`AgentConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn yaml_keeps_every_field() -> Result<()> {
        let config = AgentConfig::default()
            .gamma(0.9)
            .target_strategy(TargetStrategy::PerComponent)
            .policy(PolicyConfig::default().accel_floor(0.25).seed(7));

        let dir = TempDir::new("agent_config")?;
        let path = dir.path().join("agent.yaml");
        config.save(&path)?;
        assert_eq!(AgentConfig::load(&path)?, config);
        Ok(())
    }
}
