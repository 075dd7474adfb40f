//! The policy of the tractor and its bootstrapped update.
use super::{AgentConfig, ConsecutiveSteering, EpsilonGreedy, PolicyConfig, TargetStrategy};
use crate::{
    record::{Record, RecordValue},
    Action, ActionValues, Agent, Observation, Policy, QModel, ReplayBufferBase, Transition,
};
use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::path::Path;

/// Epsilon-greedy policy over a learned [`QModel`] with forward-biased overrides.
///
/// In training mode, an action is drawn uniformly from the exploration ranges
/// with probability epsilon; otherwise the model output is clamped and
/// corrected:
///
/// * all components below the degenerate threshold: replaced by the default action,
/// * acceleration below the floor: raised to the training boost.
///
/// In evaluation mode the policy never explores. The default action steers
/// with [`ConsecutiveSteering`] and is also used when no model is present.
pub struct TractorAgent<M> {
    model: Option<M>,
    policy: PolicyConfig,
    explorer: EpsilonGreedy,
    steering: ConsecutiveSteering,
    gamma: f32,
    target_strategy: TargetStrategy,
    train: bool,
    rng: SmallRng,
}

impl<M: QModel> TractorAgent<M> {
    /// Constructs the agent in training mode.
    ///
    /// `model` can be `None` for an evaluation without a trained model.
    pub fn build(config: AgentConfig, model: Option<M>) -> Self {
        Self {
            model,
            rng: SmallRng::seed_from_u64(config.policy.seed),
            explorer: EpsilonGreedy::new(config.exploration),
            steering: ConsecutiveSteering::new(config.steering),
            policy: config.policy,
            gamma: config.gamma,
            target_strategy: config.target_strategy,
            train: true,
        }
    }

    /// The learned model, if any.
    pub fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    /// Returns `true` if a model is present.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    fn uniform(&mut self, (lo, hi): (f32, f32)) -> f32 {
        if hi > lo {
            self.rng.gen_range(lo..=hi)
        } else {
            lo
        }
    }

    fn random_action(&mut self) -> Action {
        let acceleration = self.uniform(self.policy.explore_acceleration);
        let steering = self.uniform(self.policy.explore_steering);
        let brake = self.uniform(self.policy.explore_brake);
        Action::clamped(acceleration, steering, brake)
    }

    fn default_action(&mut self) -> Action {
        let steering = if self.train {
            let w = self.policy.default_steering_spread;
            self.uniform((-w, w))
        } else {
            self.steering.next(&mut self.rng)
        };
        Action::clamped(self.policy.default_acceleration, steering, 0.0)
    }

    fn fallback_action(&mut self) -> Action {
        let w = self.policy.fallback_steering_spread;
        let steering = self.uniform((-w, w));
        Action::clamped(self.policy.default_acceleration, steering, 0.0)
    }

    fn exploit(&mut self, obs: &Observation) -> Action {
        let values = match self.model.as_ref().map(|m| m.predict(obs)) {
            None => return self.default_action(),
            Some(Err(e)) => {
                warn!("Model inference failed, using the fallback action: {}", e);
                return self.fallback_action();
            }
            Some(Ok(values)) => values,
        };

        let mut act = Action::from(values);
        let th = self.policy.degenerate_threshold;
        if act.to_array().iter().all(|v| v.abs() < th) {
            return self.default_action();
        }

        if act.acceleration < self.policy.accel_floor {
            if self.train {
                act.acceleration = self.policy.train_accel_boost;
            } else {
                act.acceleration = self.policy.eval_accel_boost;
                act.brake = 0.0;
                if act.steering.abs() < th {
                    act.steering = self.steering.next(&mut self.rng);
                }
            }
        }
        act.clamp()
    }

    /// Builds the regression targets of a batch.
    ///
    /// `targets` holds the current predictions for the states of the batch and
    /// is overwritten with the bootstrapped values.
    fn bootstrap(
        &self,
        batch: &[Transition],
        next_values: &[ActionValues],
        targets: &mut [ActionValues],
    ) {
        for ((tr, q_next), target) in batch.iter().zip(next_values).zip(targets.iter_mut()) {
            match self.target_strategy {
                TargetStrategy::Uniform => {
                    let t = if tr.done {
                        tr.reward
                    } else {
                        let max = q_next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                        tr.reward + self.gamma * max
                    };
                    *target = [t; 3];
                }
                TargetStrategy::PerComponent => {
                    for (t, q) in target.iter_mut().zip(q_next) {
                        *t = if tr.done {
                            tr.reward
                        } else {
                            tr.reward + self.gamma * q
                        };
                    }
                }
            }
        }
    }
}

impl<M: QModel> Policy for TractorAgent<M> {
    fn select_action(&mut self, obs: &Observation) -> Action {
        if self.train && self.explorer.explore(&mut self.rng) {
            self.random_action()
        } else {
            self.exploit(obs)
        }
    }
}

impl<M, R> Agent<R> for TractorAgent<M>
where
    M: QModel,
    R: ReplayBufferBase<Batch = Vec<Transition>>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn opt(&mut self, buffer: &mut R, batch_size: usize) -> Result<Option<Record>> {
        if self.model.is_none() {
            return Ok(None);
        }
        let batch = buffer.batch(batch_size)?;
        let states: Vec<Observation> = batch.iter().map(|tr| tr.state.clone()).collect();
        let next_states: Vec<Observation> =
            batch.iter().map(|tr| tr.next_state.clone()).collect();

        let (mut targets, next_values) = match self.model.as_ref() {
            Some(model) => (
                model.predict_batch(&states)?,
                model.predict_batch(&next_states)?,
            ),
            None => return Ok(None),
        };
        self.bootstrap(&batch, &next_values, &mut targets);

        let loss = match self.model.as_mut() {
            Some(model) => model.fit(&states, &targets)?,
            None => return Ok(None),
        };
        debug!("Optimized on {} transitions, loss = {}", batch.len(), loss);

        Ok(Some(Record::from_slice(&[(
            "loss",
            RecordValue::Scalar(loss),
        )])))
    }

    fn end_episode(&mut self) {
        self.explorer.decay();
    }

    fn exploration_rate(&self) -> f64 {
        self.explorer.eps()
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        match self.model.as_ref() {
            Some(model) => {
                model.save(path)?;
                info!("Saved the model to {:?}", path);
                Ok(())
            }
            None => {
                info!("No model to save");
                Ok(())
            }
        }
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        match self.model.as_mut() {
            Some(model) => model.load(path),
            None => Err(anyhow!("No model to load parameters into")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        agent::ExplorationConfig, dummy::CountingModel, replay_buffer::ReplayBuffer,
        ExperienceBufferBase, ReplayBufferConfig,
    };

    fn obs() -> Observation {
        Observation::zeros(7)
    }

    fn greedy_config() -> AgentConfig {
        AgentConfig::default().exploration(ExplorationConfig::default().eps_start(0.0).eps_min(0.0))
    }

    fn agent(model: CountingModel) -> TractorAgent<CountingModel> {
        TractorAgent::build(greedy_config(), Some(model))
    }

    fn select_eval(agent: &mut TractorAgent<CountingModel>) -> Action {
        Agent::<ReplayBuffer>::eval(agent);
        agent.select_action(&obs())
    }

    #[test]
    fn exploratory_actions_stay_in_the_exploration_ranges() {
        let mut agent: TractorAgent<CountingModel> = TractorAgent::build(AgentConfig::default(), None);
        for _ in 0..200 {
            let a = agent.select_action(&obs());
            assert!((0.5..=1.0).contains(&a.acceleration));
            assert!((-0.8..=0.8).contains(&a.steering));
            assert!((0.0..=0.1).contains(&a.brake));
        }
    }

    #[test]
    fn model_output_is_clamped() {
        let mut agent = agent(CountingModel::constant([3.0, -5.0, 1.0]));
        assert_eq!(agent.select_action(&obs()), Action::new(1.0, -1.0, 0.2));
    }

    #[test]
    fn degenerate_output_is_replaced_in_training_mode() {
        let mut agent = agent(CountingModel::constant([0.05, -0.02, 0.0]));
        for _ in 0..50 {
            let a = agent.select_action(&obs());
            assert_eq!(a.acceleration, 0.7);
            assert!(a.steering.abs() <= 0.3);
            assert_eq!(a.brake, 0.0);
        }
    }

    #[test]
    fn degenerate_output_steers_consecutively_in_evaluation_mode() {
        let mut agent = agent(CountingModel::constant([0.0, 0.0, 0.0]));
        let first = select_eval(&mut agent);
        assert_eq!(first.acceleration, 0.7);
        assert!([-0.8, -0.6, 0.6, 0.8].contains(&first.steering));
        let second = agent.select_action(&obs());
        assert_eq!(second.steering, first.steering);
    }

    #[test]
    fn low_acceleration_is_boosted_per_mode() {
        let mut agent = agent(CountingModel::constant([0.1, 0.5, 0.15]));
        assert_eq!(agent.select_action(&obs()), Action::new(0.5, 0.5, 0.15));
        assert_eq!(select_eval(&mut agent), Action::new(0.7, 0.5, 0.0));

        let mut agent = self::agent(CountingModel::constant([0.1, 0.05, 0.15]));
        let a = select_eval(&mut agent);
        assert_eq!(a.acceleration, 0.7);
        assert!([-0.8, -0.6, 0.6, 0.8].contains(&a.steering));
    }

    #[test]
    fn inference_failure_falls_back_for_the_step() {
        let mut agent = agent(CountingModel::failing());
        let a = agent.select_action(&obs());
        assert_eq!(a.acceleration, 0.7);
        assert!(a.steering.abs() <= 0.8);
        assert_eq!(a.brake, 0.0);
    }

    #[test]
    fn evaluation_without_a_model_uses_the_default_action() {
        let mut agent: TractorAgent<CountingModel> = TractorAgent::build(greedy_config(), None);
        let a = select_eval(&mut agent);
        assert_eq!(a.acceleration, 0.7);
        assert_eq!(a.brake, 0.0);
        assert!([-0.8, -0.6, 0.6, 0.8].contains(&a.steering));
    }

    fn transition(reward: f32, done: bool) -> Transition {
        Transition::new(obs(), Action::new(0.5, 0.0, 0.0), reward, obs(), done)
    }

    #[test]
    fn uniform_targets_bootstrap_from_the_best_output() {
        let agent = agent(CountingModel::constant([0.0, 0.0, 0.0]));
        let batch = vec![transition(1.0, false), transition(2.0, true)];
        let next = vec![[1.0, 4.0, 2.0], [10.0, 10.0, 10.0]];
        let mut targets = vec![[0.0; 3]; 2];
        agent.bootstrap(&batch, &next, &mut targets);
        let t = 1.0 + 0.95 * 4.0;
        assert_eq!(targets, vec![[t, t, t], [2.0, 2.0, 2.0]]);
    }

    #[test]
    fn per_component_targets_bootstrap_from_each_output() {
        let agent = TractorAgent::build(
            greedy_config().target_strategy(TargetStrategy::PerComponent),
            Some(CountingModel::constant([0.0; 3])),
        );
        let batch = vec![transition(1.0, false), transition(2.0, true)];
        let next = vec![[1.0, 4.0, 2.0], [10.0, 10.0, 10.0]];
        let mut targets = vec![[0.0; 3]; 2];
        agent.bootstrap(&batch, &next, &mut targets);
        assert_eq!(
            targets,
            vec![[1.0 + 0.95, 1.0 + 0.95 * 4.0, 1.0 + 0.95 * 2.0], [2.0, 2.0, 2.0]]
        );
    }

    #[test]
    fn opt_fits_once_on_a_sampled_batch() -> Result<()> {
        let model = CountingModel::constant([0.5, 0.5, 0.5]);
        let fits = model.fit_counter();
        let mut agent = agent(model);
        let mut buffer = ReplayBuffer::build(&ReplayBufferConfig::default());
        for i in 0..40 {
            buffer.push(transition(i as f32, i % 10 == 9))?;
        }

        let record = agent.opt(&mut buffer, 32)?.unwrap();
        assert_eq!(fits.get(), 1);
        assert!(record.get_scalar("loss").is_ok());
        assert_eq!(agent.model().unwrap().last_fit_len(), Some(32));
        Ok(())
    }

    #[test]
    fn epsilon_decays_at_episode_end() {
        let mut agent: TractorAgent<CountingModel> = TractorAgent::build(AgentConfig::default(), None);
        assert_eq!(Agent::<ReplayBuffer>::exploration_rate(&agent), 1.0);
        Agent::<ReplayBuffer>::end_episode(&mut agent);
        assert_eq!(Agent::<ReplayBuffer>::exploration_rate(&agent), 0.995);
    }
}
