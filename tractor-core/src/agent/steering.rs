//! Consecutive steering: a held turn instead of per-step steering noise.
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Configuration of [`ConsecutiveSteering`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SteeringConfig {
    /// Steering values a hold can take.
    pub choices: Vec<f32>,

    /// Shortest hold in steps, inclusive.
    pub min_duration: usize,

    /// Longest hold in steps, exclusive.
    pub max_duration: usize,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            choices: vec![-0.8, -0.6, 0.6, 0.8],
            min_duration: 15,
            max_duration: 30,
        }
    }
}

/// Steering-hold state.
///
/// Each hold returns the same steering value for a number of calls drawn
/// from `[min_duration, max_duration)`, then a new value and duration are drawn.
#[derive(Debug, Clone)]
pub struct ConsecutiveSteering {
    config: SteeringConfig,
    current: f32,
    remaining: usize,
}

impl ConsecutiveSteering {
    /// Creates a heuristic with no hold in progress.
    pub fn new(config: SteeringConfig) -> Self {
        Self {
            config,
            current: 0.0,
            remaining: 0,
        }
    }

    /// Returns the steering value for this step.
    pub fn next(&mut self, rng: &mut impl Rng) -> f32 {
        if self.remaining == 0 {
            self.current = self.config.choices.choose(rng).copied().unwrap_or(0.0);
            self.remaining = if self.config.max_duration > self.config.min_duration {
                rng.gen_range(self.config.min_duration..self.config.max_duration)
            } else {
                self.config.min_duration
            }
            .max(1);
        }
        self.remaining -= 1;
        self.current
    }

    /// Calls left before a new hold is drawn.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::SmallRng, SeedableRng};

    proptest! {
        #[test]
        fn holds_are_constant_for_their_duration(seed in any::<u64>()) {
            let config = SteeringConfig::default();
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut steering = ConsecutiveSteering::new(config.clone());

            for _ in 0..5 {
                let first = steering.next(&mut rng);
                let duration = steering.remaining() + 1;
                prop_assert!((15..30).contains(&duration));
                prop_assert!(config.choices.contains(&first));

                for _ in 1..duration {
                    prop_assert_eq!(steering.next(&mut rng), first);
                }
                prop_assert_eq!(steering.remaining(), 0);
            }
        }
    }

    #[test]
    fn degenerate_duration_range_still_holds_one_step() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut steering = ConsecutiveSteering::new(SteeringConfig {
            choices: vec![0.6],
            min_duration: 0,
            max_duration: 0,
        });
        assert_eq!(steering.next(&mut rng), 0.6);
        assert_eq!(steering.remaining(), 0);
    }
}
