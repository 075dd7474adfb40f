//! The episode controller.
use super::{ControllerConfig, ControllerState, FailureReason};
use crate::{
    codec::{StateCodec, StateMessage},
    error::{ChannelError, ControllerError},
    record::{EpisodeSummary, MetricsRecorder},
    util::StopSignal,
    Action, ActionFlags, Agent, Channel, Connector, ExperienceBufferBase, Observation, Policy,
    ReplayBufferBase, Trainer, Transition,
};
use anyhow::anyhow;
use chrono::Local;
use log::{info, trace, warn};

/// Counters of a training run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Successful connections.
    pub connects: usize,

    /// Backoff waits completed before a new connection attempt.
    pub reconnects: usize,

    /// Failed episode attempts.
    pub failed_attempts: usize,

    /// Completed episodes.
    pub episodes: usize,

    /// Environment steps over all episodes.
    pub steps: usize,

    /// Optimization steps.
    pub opt_steps: usize,
}

/// Counters of the episode in progress.
#[derive(Debug, Default)]
struct EpisodeProgress {
    obs: Option<Observation>,
    action: Option<Action>,
    steps: usize,
    total_reward: f32,
    max_progress: f32,
    losses: Vec<f32>,
}

impl EpisodeProgress {
    fn observe(&mut self, msg: &StateMessage) {
        if let Some(p) = msg.progress() {
            self.max_progress = self.max_progress.max(p);
        }
    }

    fn mean_loss(&self) -> Option<f32> {
        match self.losses.len() {
            0 => None,
            n => Some(self.losses.iter().sum::<f32>() / n as f32),
        }
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Drives training episodes against the simulator.
///
/// The controller owns the connection and the per-episode counters; the agent
/// and the replay buffer are lent to [`EpisodeController::run`]. Sends and
/// receives alternate strictly.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Connecting
///     Connecting --> AwaitingObservation
///     AwaitingObservation --> Acting
///     AwaitingObservation --> EpisodeDone: done
///     Acting --> AwaitingResult
///     AwaitingResult --> Acting
///     AwaitingResult --> EpisodeDone: done or step cap
///     EpisodeDone --> Connecting
///     EpisodeDone --> AwaitingObservation: reuse_connection
///     EpisodeDone --> Finished: max_episodes
///     Connecting --> Reconnecting: failure
///     AwaitingObservation --> Reconnecting: failure
///     Acting --> Reconnecting: failure
///     AwaitingResult --> Reconnecting: failure
///     Reconnecting --> Connecting: after backoff
///     Finished --> [*]
/// ```
///
/// A failure of the transport or the model abandons the episode attempt; the
/// transitions already stored stay in the buffer. After the backoff of
/// [`ReconnectPolicy`](super::ReconnectPolicy) the episode is attempted again.
/// Malformed messages are logged and skipped.
///
/// A raised [`StopSignal`] is honored at every state transition and during the
/// backoff. At the end of the run, whether by exhausting the episode budget or
/// by a stop, the model and the metrics are saved.
pub struct EpisodeController<C: Connector> {
    connector: C,
    channel: Option<C::Channel>,
    config: ControllerConfig,
    codec: StateCodec,
    trainer: Trainer,
    stop: StopSignal,
    metrics: MetricsRecorder,
    stats: ControllerStats,
    episode: EpisodeProgress,
    consecutive_failures: usize,
}

impl<C: Connector> EpisodeController<C> {
    /// Constructs a controller.
    pub fn build(config: ControllerConfig, trainer: Trainer, connector: C) -> Self {
        Self {
            connector,
            channel: None,
            config,
            codec: StateCodec::default(),
            trainer,
            stop: StopSignal::new(),
            metrics: MetricsRecorder::new(),
            stats: ControllerStats::default(),
            episode: EpisodeProgress::default(),
            consecutive_failures: 0,
        }
    }

    /// Sets the stop signal observed by the run.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// A handle to the stop signal of the run.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Episode summaries recorded so far.
    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Counters of the run.
    pub fn stats(&self) -> &ControllerStats {
        &self.stats
    }

    /// Trains `agent` for `max_episodes` episodes.
    pub fn run<A, R>(&mut self, agent: &mut A, buffer: &mut R) -> Result<(), ControllerError>
    where
        A: Agent<R>,
        R: ReplayBufferBase + ExperienceBufferBase<Item = Transition>,
    {
        agent.train();
        let started = Local::now();
        info!(
            "Start training for {} episodes at {}",
            self.config.max_episodes,
            started.format("%Y-%m-%d %H:%M:%S")
        );

        let mut outcome = Ok(());
        let mut state = if self.config.max_episodes == 0 {
            ControllerState::Finished
        } else {
            ControllerState::Connecting
        };

        loop {
            // A finished episode is still recorded when the stop arrives.
            if self.stop.is_stopped()
                && !matches!(
                    state,
                    ControllerState::Finished | ControllerState::EpisodeDone
                )
            {
                info!("Stop requested in state {}", state);
                state = ControllerState::Finished;
            }

            let next = match state {
                ControllerState::Connecting => self.connect(),
                ControllerState::AwaitingObservation => {
                    self.await_observation(agent.exploration_rate())
                }
                ControllerState::Acting => self.act(agent),
                ControllerState::AwaitingResult => self.await_result(agent, buffer),
                ControllerState::EpisodeDone => {
                    let eps = agent.exploration_rate();
                    agent.end_episode();
                    Ok(self.finish_episode(eps, agent.exploration_rate()))
                }
                ControllerState::Reconnecting(reason) => match self.reconnect(reason) {
                    Ok(next) => Ok(next),
                    Err(e) => {
                        outcome = Err(e);
                        break;
                    }
                },
                ControllerState::Finished => break,
            };

            state = match next {
                Ok(next) => next,
                Err(_) if self.stop.is_stopped() => ControllerState::Finished,
                Err(reason) => ControllerState::Reconnecting(reason),
            };
            trace!("-> {}", state);
        }

        self.close_channel();
        let elapsed = Local::now().signed_duration_since(started);
        info!("Run took {} s", elapsed.num_seconds());
        self.log_final_stats(agent.exploration_rate());

        // Both artifacts are attempted; the first failure is reported unless
        // the run already failed.
        let mut failures = vec![];
        if let Some(path) = &self.config.metrics_path {
            if let Err(e) = self.metrics.save_csv(path) {
                warn!("Failed to save the metrics to {:?}: {}", path, e);
                failures.push(e);
            }
        }
        if let Err(e) = agent.save_params(&self.config.model_path) {
            warn!(
                "Failed to save the model to {:?}: {}",
                self.config.model_path, e
            );
            failures.push(e);
        }

        let persisted = match failures.into_iter().next() {
            Some(e) => Err(ControllerError::Persist(e)),
            None => Ok(()),
        };
        outcome.and(persisted)
    }

    fn connect(&mut self) -> Result<ControllerState, FailureReason> {
        let channel = self.connector.connect()?;
        info!("Connected to the simulator");
        self.stats.connects += 1;
        self.channel = Some(channel);
        Ok(ControllerState::AwaitingObservation)
    }

    fn close_channel(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
    }

    fn channel_mut(&mut self) -> Result<&mut C::Channel, FailureReason> {
        self.channel
            .as_mut()
            .ok_or(FailureReason::Transport(ChannelError::Closed))
    }

    /// Receives the next well-formed state message, skipping malformed ones.
    fn receive_state(&mut self) -> Result<StateMessage, FailureReason> {
        loop {
            let raw = self.channel_mut()?.receive()?;
            match self.codec.decode(&raw) {
                Ok(msg) => return Ok(msg),
                Err(e) => warn!("Skipped a malformed state message: {}", e),
            }
        }
    }

    fn await_observation(&mut self, eps: f64) -> Result<ControllerState, FailureReason> {
        info!(
            "Episode {}/{} | epsilon = {:.3}",
            self.stats.episodes + 1,
            self.config.max_episodes,
            eps
        );
        let msg = self.receive_state()?;

        self.episode = EpisodeProgress::default();
        self.episode.observe(&msg);
        let done = msg.done;
        self.episode.obs = Some(msg.observation);

        if done {
            info!("The episode ended before the first step");
            Ok(ControllerState::EpisodeDone)
        } else {
            Ok(ControllerState::Acting)
        }
    }

    fn act<P: Policy>(&mut self, policy: &mut P) -> Result<ControllerState, FailureReason> {
        let obs = self
            .episode
            .obs
            .as_ref()
            .ok_or_else(|| FailureReason::Episode(anyhow!("No observation to act on")))?;
        let action = policy.select_action(obs).clamp();
        let raw = self.codec.encode(&action, ActionFlags::default());
        self.channel_mut()?.send(&raw)?;
        self.episode.action = Some(action);
        Ok(ControllerState::AwaitingResult)
    }

    fn await_result<A, R>(
        &mut self,
        agent: &mut A,
        buffer: &mut R,
    ) -> Result<ControllerState, FailureReason>
    where
        A: Agent<R>,
        R: ReplayBufferBase + ExperienceBufferBase<Item = Transition>,
    {
        let msg = self.receive_state()?;
        let (state, action) = match (self.episode.obs.take(), self.episode.action.take()) {
            (Some(state), Some(action)) => (state, action),
            _ => {
                return Err(FailureReason::Episode(anyhow!(
                    "Received a result without a pending action"
                )))
            }
        };

        let reward = msg.reward.unwrap_or(0.0);
        buffer
            .push(Transition::new(
                state,
                action,
                reward,
                msg.observation.clone(),
                msg.done,
            ))
            .map_err(FailureReason::Episode)?;

        let record = self
            .trainer
            .maybe_train(agent, buffer, self.episode.steps)
            .map_err(FailureReason::Episode)?;
        if let Some(record) = record {
            self.stats.opt_steps += 1;
            if let Ok(loss) = record.get_scalar("loss") {
                self.episode.losses.push(loss);
            }
        }

        self.episode.steps += 1;
        self.stats.steps += 1;
        self.episode.total_reward += reward;
        self.episode.observe(&msg);

        if self.config.log_interval > 0 && self.episode.steps % self.config.log_interval == 0 {
            info!(
                "Step {} | reward = {:.1} | progress = {:.1}%",
                self.episode.steps,
                self.episode.total_reward,
                msg.progress().unwrap_or(0.0)
            );
        }

        let done = msg.done;
        self.episode.obs = Some(msg.observation);
        if done || self.episode.steps >= self.config.max_steps_per_episode {
            Ok(ControllerState::EpisodeDone)
        } else {
            Ok(ControllerState::Acting)
        }
    }

    /// Records the summary of the finished episode and picks the next state.
    ///
    /// `eps` is the exploration rate in effect during the episode, `eps_next`
    /// the one after the decay.
    fn finish_episode(&mut self, eps: f64, eps_next: f64) -> ControllerState {
        self.stats.episodes += 1;
        self.consecutive_failures = 0;

        let episode = std::mem::take(&mut self.episode);
        let summary = EpisodeSummary {
            episode: self.stats.episodes,
            total_reward: episode.total_reward,
            step_count: episode.steps,
            final_epsilon: eps,
            max_progress: episode.max_progress,
            mean_loss: episode.mean_loss(),
        };
        info!(
            "Episode {} done | reward = {:.1} | steps = {} | max progress = {:.1}% | epsilon = {:.3}",
            summary.episode, summary.total_reward, summary.step_count, summary.max_progress, eps_next
        );
        self.metrics.push(summary);

        let window = self.config.stats_window;
        if window > 0 && self.stats.episodes % window == 0 {
            if let Some(w) = self.metrics.window_stats(window) {
                info!(
                    "Last {} episodes | mean reward = {:.1} | mean progress = {:.1}%",
                    w.n_episodes, w.mean_reward, w.mean_progress
                );
            }
        }

        if self.stats.episodes >= self.config.max_episodes {
            ControllerState::Finished
        } else if self.config.reuse_connection && self.channel.is_some() {
            ControllerState::AwaitingObservation
        } else {
            self.close_channel();
            ControllerState::Connecting
        }
    }

    fn reconnect(&mut self, reason: FailureReason) -> Result<ControllerState, ControllerError> {
        self.close_channel();
        self.stats.failed_attempts += 1;
        self.consecutive_failures += 1;

        if let Some(max) = self.config.reconnect.max_retries {
            if self.consecutive_failures > max {
                return Err(ControllerError::RetriesExhausted {
                    attempts: self.consecutive_failures,
                    last: reason.to_string(),
                });
            }
        }

        let backoff = self.config.reconnect.backoff();
        warn!(
            "Episode {} failed ({}), reconnecting in {:?}",
            self.stats.episodes + 1,
            reason,
            backoff
        );
        if !self.stop.sleep(backoff) {
            return Ok(ControllerState::Finished);
        }
        self.stats.reconnects += 1;
        Ok(ControllerState::Connecting)
    }

    fn log_final_stats(&self, eps: f64) {
        info!("Training finished after {} episodes", self.metrics.len());
        if let Some(best) = self.metrics.best_episode() {
            info!(
                "Best reward = {:.1} (episode {})",
                best.total_reward, best.episode
            );
        }
        if let Some(mean) = self.metrics.mean_reward() {
            info!("Mean reward = {:.1}", mean);
        }
        if let Some(progress) = self.metrics.best_progress() {
            info!("Best progress = {:.1}%", progress);
        }
        info!("Final epsilon = {:.3}", eps);
    }
}
