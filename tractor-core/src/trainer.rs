//! Periodic optimization of an [`Agent`] from its replay buffer.
mod config;
use crate::{record::Record, Agent, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
pub use config::TrainerConfig;
use log::trace;

/// Decides when an optimization step runs.
///
/// After every environment step the controller calls [`Trainer::maybe_train`].
/// An optimization step runs when the buffer holds more than `batch_size`
/// transitions and the step index is a multiple of `train_interval`; it samples
/// one batch, bootstraps the targets and fits the model once.
///
/// Errors of the model are not caught here. They end the current episode
/// attempt of the controller.
#[derive(Debug, Clone)]
pub struct Trainer {
    batch_size: usize,
    train_interval: usize,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            train_interval: config.train_interval.max(1),
        }
    }

    /// Number of transitions per optimization step.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns `true` if an optimization step is due at `step_index`.
    pub fn is_due(&self, buffer_len: usize, step_index: usize) -> bool {
        buffer_len > self.batch_size && step_index % self.train_interval == 0
    }

    /// Runs an optimization step of `agent` if one is due at `step_index`.
    ///
    /// Returns the record of the step, or `None` if no step ran.
    pub fn maybe_train<A, R>(
        &self,
        agent: &mut A,
        buffer: &mut R,
        step_index: usize,
    ) -> Result<Option<Record>>
    where
        A: Agent<R>,
        R: ReplayBufferBase + ExperienceBufferBase,
    {
        if !self.is_due(buffer.len(), step_index) {
            return Ok(None);
        }
        trace!("Optimization step at step index {}", step_index);
        agent.opt(buffer, self.batch_size)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        agent::{AgentConfig, TractorAgent},
        dummy::CountingModel,
        replay_buffer::ReplayBuffer,
        Action, Observation, ReplayBufferConfig, Transition,
    };

    fn filled_buffer(n: usize) -> ReplayBuffer {
        let mut buffer = ReplayBuffer::build(&ReplayBufferConfig::default());
        for i in 0..n {
            buffer.append(Transition::new(
                Observation::zeros(7),
                Action::new(0.5, 0.0, 0.0),
                i as f32,
                Observation::zeros(7),
                false,
            ));
        }
        buffer
    }

    #[test]
    fn trains_exactly_on_divisible_steps() -> Result<()> {
        let model = CountingModel::constant([0.5, 0.5, 0.5]);
        let fits = model.fit_counter();
        let mut agent = TractorAgent::build(AgentConfig::default(), Some(model));
        let mut buffer = filled_buffer(40);
        let trainer = Trainer::build(TrainerConfig::default());

        for step in [1, 2, 3, 5, 6, 7, 9, 10, 11] {
            assert!(trainer.maybe_train(&mut agent, &mut buffer, step)?.is_none());
        }
        assert_eq!(fits.get(), 0);

        let record = trainer.maybe_train(&mut agent, &mut buffer, 8)?;
        assert!(record.is_some());
        assert_eq!(fits.get(), 1);
        assert_eq!(agent.model().unwrap().last_fit_len(), Some(32));
        Ok(())
    }

    #[test]
    fn waits_for_more_than_a_batch() -> Result<()> {
        let model = CountingModel::constant([0.5, 0.5, 0.5]);
        let fits = model.fit_counter();
        let mut agent = TractorAgent::build(AgentConfig::default(), Some(model));
        let mut buffer = filled_buffer(32);
        let trainer = Trainer::build(TrainerConfig::default());

        assert!(trainer.maybe_train(&mut agent, &mut buffer, 0)?.is_none());
        assert!(trainer.maybe_train(&mut agent, &mut buffer, 4)?.is_none());
        assert_eq!(fits.get(), 0);

        buffer.append(Transition::new(
            Observation::zeros(7),
            Action::new(0.5, 0.0, 0.0),
            0.0,
            Observation::zeros(7),
            true,
        ));
        assert!(trainer.maybe_train(&mut agent, &mut buffer, 4)?.is_some());
        assert_eq!(fits.get(), 1);
        Ok(())
    }
}
