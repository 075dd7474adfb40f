//! The standalone evaluator.
use super::EvaluatorConfig;
use crate::{
    codec::StateCodec,
    error::{ChannelError, ControllerError},
    record::{EpisodeSummary, MetricsRecorder},
    util::StopSignal,
    ActionFlags, Channel, Connector, Policy,
};
use log::{info, warn};

#[derive(Debug, Default)]
struct EvalEpisode {
    steps: usize,
    total_reward: f32,
    max_progress: f32,
}

/// Runs a policy against the simulator without training.
///
/// The evaluation uses a single connection and never reconnects: a failure
/// to connect or a transport error ends the run. Malformed messages are
/// logged and skipped.
///
/// Every received state is answered with an action whose `reset_episode` flag
/// echoes the `done` flag of the state. A state with `done` after at least one
/// step closes the current episode; its summary is logged and recorded and the
/// next episode continues on the same connection.
///
/// The caller of [`Evaluator::run`] needs to handle the internal state of the
/// policy, like training/evaluation mode.
pub struct Evaluator<C: Connector> {
    connector: C,
    config: EvaluatorConfig,
    codec: StateCodec,
    stop: StopSignal,
    metrics: MetricsRecorder,
}

impl<C: Connector> Evaluator<C> {
    /// Constructs an evaluator.
    pub fn build(config: EvaluatorConfig, connector: C) -> Self {
        Self {
            connector,
            config,
            codec: StateCodec::default(),
            stop: StopSignal::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Sets the stop signal observed by the run.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Episode summaries recorded so far.
    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Evaluates `policy` until the connection closes, the episode budget is
    /// reached or a stop is requested.
    pub fn run<P: Policy>(&mut self, policy: &mut P) -> Result<(), ControllerError> {
        let mut channel = self.connector.connect()?;
        info!("Connected to the simulator, evaluation starts");

        let mut episode = EvalEpisode::default();
        let result = loop {
            if self.stop.is_stopped() {
                info!("Stop requested, evaluation ends");
                break Ok(());
            }

            let raw = match channel.receive() {
                Ok(raw) => raw,
                Err(ChannelError::Closed) => {
                    warn!("Connection closed by the simulator");
                    break Ok(());
                }
                Err(ChannelError::Cancelled) => break Ok(()),
                Err(ChannelError::Protocol(e)) => {
                    warn!("Skipped a message: {}", e);
                    continue;
                }
                Err(e) => break Err(ControllerError::Transport(e)),
            };
            let msg = match self.codec.decode(&raw) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("Skipped a malformed state message: {}", e);
                    continue;
                }
            };

            if let Some(reward) = msg.reward {
                episode.total_reward += reward;
            }
            if let Some(p) = msg.progress() {
                episode.max_progress = episode.max_progress.max(p);
            }

            if msg.done && episode.steps > 0 {
                self.finish_episode(std::mem::take(&mut episode));
                if self
                    .config
                    .max_episodes
                    .map_or(false, |n| self.metrics.len() >= n)
                {
                    break Ok(());
                }
                info!("Episode {} starts", self.metrics.len() + 1);
            }

            let action = policy.select_action(&msg.observation).clamp();
            let flags = ActionFlags {
                four_wheel_drive: false,
                reset_episode: msg.done,
            };
            match channel.send(&self.codec.encode(&action, flags)) {
                Ok(()) => {}
                Err(ChannelError::Closed) => {
                    warn!("Connection closed by the simulator");
                    break Ok(());
                }
                Err(ChannelError::Cancelled) => break Ok(()),
                Err(e) => break Err(ControllerError::Transport(e)),
            }
            episode.steps += 1;

            let interval = self.config.log_interval;
            if interval > 0 && episode.steps % interval == 0 {
                info!(
                    "Step {} | reward = {:.1} | progress = {:.1}%",
                    episode.steps,
                    episode.total_reward,
                    msg.progress().unwrap_or(0.0)
                );
            }
        };
        channel.close();

        info!("Evaluation finished after {} episodes", self.metrics.len());
        if let Some(best) = self.metrics.best_episode() {
            info!(
                "Best reward = {:.1} (episode {})",
                best.total_reward, best.episode
            );
        }
        if let Some(path) = &self.config.metrics_path {
            self.metrics
                .save_csv(path)
                .map_err(ControllerError::Persist)?;
        }
        result
    }

    fn finish_episode(&mut self, episode: EvalEpisode) {
        let summary = EpisodeSummary {
            episode: self.metrics.len() + 1,
            total_reward: episode.total_reward,
            step_count: episode.steps,
            final_epsilon: 0.0,
            max_progress: episode.max_progress,
            mean_loss: None,
        };
        info!(
            "Episode {} done | reward = {:.1} | steps = {} | max progress = {:.1}%",
            summary.episode, summary.total_reward, summary.step_count, summary.max_progress
        );
        self.metrics.push(summary);
    }
}
