//! FIFO replay buffer of [`Transition`]s.
use super::ReplayBufferConfig;
use crate::{error::ReplayBufferError, ExperienceBufferBase, ReplayBufferBase, Transition};
use anyhow::Result;
use rand::{rngs::StdRng, seq::index, SeedableRng};
use std::collections::VecDeque;

/// A capacity-bounded store of transitions.
///
/// Once full, every push evicts the oldest transition, so the buffer always
/// holds the `capacity` most recently pushed transitions. Batches are sampled
/// uniformly without replacement within a call; separate calls are independent.
pub struct ReplayBuffer {
    /// Maximum number of transitions that can be stored.
    capacity: usize,

    /// Stored transitions, oldest first.
    buf: VecDeque<Transition>,

    /// Random number generator for sampling.
    rng: StdRng,
}

impl ReplayBuffer {
    /// Maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a transition, evicting the oldest one when full.
    pub fn append(&mut self, tr: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(tr);
    }

    /// Samples `k` distinct transitions.
    ///
    /// Fails with [`ReplayBufferError::InsufficientData`] if fewer than `k`
    /// transitions are stored.
    pub fn sample(&mut self, k: usize) -> Result<Vec<Transition>, ReplayBufferError> {
        let available = self.buf.len();
        if available < k {
            return Err(ReplayBufferError::InsufficientData {
                requested: k,
                available,
            });
        }
        Ok(index::sample(&mut self.rng, available, k)
            .into_iter()
            .map(|ix| self.buf[ix].clone())
            .collect())
    }

    /// Iterates over the stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buf.iter()
    }
}

impl ExperienceBufferBase for ReplayBuffer {
    type Item = Transition;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.append(tr);
        Ok(())
    }

    fn len(&self) -> usize {
        self.buf.len()
    }
}

impl ReplayBufferBase for ReplayBuffer {
    type Config = ReplayBufferConfig;
    type Batch = Vec<Transition>;

    fn build(config: &Self::Config) -> Self {
        Self {
            capacity: config.capacity,
            buf: VecDeque::with_capacity(config.capacity),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        Ok(self.sample(size)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Action, Observation};
    use proptest::prelude::*;
    use std::collections::HashSet;

    // The reward field doubles as the insertion index.
    fn transition(i: usize) -> Transition {
        Transition::new(
            Observation::zeros(7),
            Action::new(0.5, 0.0, 0.0),
            i as f32,
            Observation::zeros(7),
            false,
        )
    }

    fn buffer(capacity: usize) -> ReplayBuffer {
        ReplayBuffer::build(&ReplayBufferConfig::default().capacity(capacity))
    }

    #[test]
    fn default_capacity_is_2000() {
        let buffer = ReplayBuffer::build(&ReplayBufferConfig::default());
        assert_eq!(buffer.capacity(), 2000);
        assert!(buffer.is_empty());
    }

    #[test]
    fn sample_returns_distinct_entries() {
        let mut buffer = buffer(100);
        (0..40).for_each(|i| buffer.append(transition(i)));

        for _ in 0..20 {
            let batch = buffer.sample(32).unwrap();
            assert_eq!(batch.len(), 32);
            let ids: HashSet<u32> = batch.iter().map(|t| t.reward as u32).collect();
            assert_eq!(ids.len(), 32);
        }
    }

    #[test]
    fn sample_fails_with_too_few_entries() {
        let mut buffer = buffer(100);
        (0..31).for_each(|i| buffer.append(transition(i)));

        assert_eq!(
            buffer.sample(32),
            Err(ReplayBufferError::InsufficientData {
                requested: 32,
                available: 31
            })
        );
        assert!(buffer.batch(32).is_err());
        assert_eq!(buffer.sample(31).unwrap().len(), 31);
    }

    proptest! {
        #[test]
        fn keeps_the_most_recent_transitions(capacity in 1usize..64, n in 0usize..256) {
            let mut buffer = buffer(capacity);
            (0..n).for_each(|i| buffer.append(transition(i)));

            prop_assert!(buffer.len() <= capacity);
            let kept: Vec<usize> = buffer.iter().map(|t| t.reward as usize).collect();
            let expected: Vec<usize> = (n.saturating_sub(capacity)..n).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
