//! Epsilon-greedy exploration.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration of [`EpsilonGreedy`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ExplorationConfig {
    /// Exploration rate of the first episode.
    pub eps_start: f64,

    /// Lower bound of the exploration rate.
    pub eps_min: f64,

    /// Factor applied to the exploration rate at the end of every episode.
    pub decay: f64,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            eps_start: 1.0,
            eps_min: 0.01,
            decay: 0.995,
        }
    }
}

impl ExplorationConfig {
    /// Sets the initial exploration rate.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Sets the lower bound of the exploration rate.
    pub fn eps_min(mut self, v: f64) -> Self {
        self.eps_min = v;
        self
    }

    /// Sets the decay factor.
    pub fn decay(mut self, v: f64) -> Self {
        self.decay = v;
        self
    }
}

/// Epsilon-greedy explorer with geometric decay per episode.
///
/// The rate is derived from the number of decays instead of being updated in
/// place, so after `n` decays it is exactly `max(eps_min, eps_start * decay^n)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonGreedy {
    config: ExplorationConfig,
    n_decays: usize,
}

impl EpsilonGreedy {
    /// Constructs the explorer.
    pub fn new(config: ExplorationConfig) -> Self {
        Self {
            config,
            n_decays: 0,
        }
    }

    /// Current exploration rate.
    pub fn eps(&self) -> f64 {
        let n = i32::try_from(self.n_decays).unwrap_or(i32::MAX);
        (self.config.eps_start * self.config.decay.powi(n)).max(self.config.eps_min)
    }

    /// Number of decays applied so far.
    pub fn n_decays(&self) -> usize {
        self.n_decays
    }

    /// Applies one step of decay.
    pub fn decay(&mut self) {
        self.n_decays = self.n_decays.saturating_add(1);
    }

    /// Draws whether the next action is exploratory.
    pub fn explore(&self, rng: &mut impl Rng) -> bool {
        rng.gen::<f64>() < self.eps()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn decay_follows_the_geometric_law() {
        let mut eg = EpsilonGreedy::new(ExplorationConfig::default());
        assert_eq!(eg.eps(), 1.0);
        for _ in 0..10 {
            eg.decay();
        }
        assert_eq!(eg.eps(), 0.995f64.powi(10).max(0.01));
    }

    #[test]
    fn rate_never_goes_below_the_floor() {
        let mut eg = EpsilonGreedy::new(ExplorationConfig::default());
        let mut prev = eg.eps();
        for _ in 0..2000 {
            eg.decay();
            assert!(eg.eps() <= prev);
            prev = eg.eps();
        }
        assert_eq!(eg.eps(), 0.01);
    }

    #[test]
    fn extreme_rates_are_deterministic() {
        let mut rng = SmallRng::seed_from_u64(0);
        let always = EpsilonGreedy::new(ExplorationConfig::default());
        assert!((0..100).all(|_| always.explore(&mut rng)));

        let never = EpsilonGreedy::new(ExplorationConfig::default().eps_start(0.0).eps_min(0.0));
        assert!((0..100).all(|_| !never.explore(&mut rng)));
    }
}
