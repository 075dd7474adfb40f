//! Configuration of [`EpisodeController`](super::EpisodeController).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
    time::Duration,
};

/// What the controller does after a failed episode attempt.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct ReconnectPolicy {
    /// Wait before the next connection attempt, in milliseconds.
    pub backoff_millis: u64,

    /// Maximum number of consecutive failed attempts that are retried.
    /// `None` retries forever.
    pub max_retries: Option<usize>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            backoff_millis: 3000,
            max_retries: None,
        }
    }
}

impl ReconnectPolicy {
    /// Sets the backoff in milliseconds.
    pub fn backoff_millis(mut self, v: u64) -> Self {
        self.backoff_millis = v;
        self
    }

    /// Sets the maximum number of retries.
    pub fn max_retries(mut self, v: Option<usize>) -> Self {
        self.max_retries = v;
        self
    }

    /// The backoff as a [`Duration`].
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_millis)
    }
}

/// Configuration of [`EpisodeController`](super::EpisodeController).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ControllerConfig {
    /// Number of episodes of the run.
    pub max_episodes: usize,

    /// Episodes are cut off after this many steps.
    pub max_steps_per_episode: usize,

    /// Interval of progress logs in steps.
    pub log_interval: usize,

    /// Interval of the windowed statistics in episodes, also the window size.
    pub stats_window: usize,

    /// Keeps one connection across episodes instead of reconnecting per episode.
    pub reuse_connection: bool,

    /// Reaction to failed episode attempts.
    pub reconnect: ReconnectPolicy,

    /// Where the model is saved at the end of the run.
    pub model_path: PathBuf,

    /// Where the metrics history is written at the end of the run, if anywhere.
    pub metrics_path: Option<PathBuf>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 50,
            max_steps_per_episode: 500,
            log_interval: 100,
            stats_window: 10,
            reuse_connection: false,
            reconnect: ReconnectPolicy::default(),
            model_path: PathBuf::from("tractor_model_final.safetensors"),
            metrics_path: Some(PathBuf::from("training_progress.csv")),
        }
    }
}

impl ControllerConfig {
    /// Sets the number of episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the step cap of an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the interval of progress logs.
    pub fn log_interval(mut self, v: usize) -> Self {
        self.log_interval = v;
        self
    }

    /// Sets the interval and window of the episode statistics.
    pub fn stats_window(mut self, v: usize) -> Self {
        self.stats_window = v;
        self
    }

    /// Sets whether the connection is kept across episodes.
    pub fn reuse_connection(mut self, v: bool) -> Self {
        self.reuse_connection = v;
        self
    }

    /// Sets the reconnect policy.
    pub fn reconnect(mut self, v: ReconnectPolicy) -> Self {
        self.reconnect = v;
        self
    }

    /// Sets the path of the saved model.
    pub fn model_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.model_path = v.into();
        self
    }

    /// Sets the path of the metrics file.
    pub fn metrics_path(mut self, v: Option<PathBuf>) -> Self {
        self.metrics_path = v;
        self
    }

    /// Constructs [`ControllerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ControllerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
