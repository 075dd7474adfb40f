//! Configuration of [`Evaluator`](super::Evaluator).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`Evaluator`](super::Evaluator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct EvaluatorConfig {
    /// Number of episodes after which the evaluation ends. `None` runs until
    /// the simulator closes the connection.
    pub max_episodes: Option<usize>,

    /// Interval of progress logs in steps.
    pub log_interval: usize,

    /// Where the metrics history is written at the end, if anywhere.
    pub metrics_path: Option<PathBuf>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_episodes: None,
            log_interval: 100,
            metrics_path: None,
        }
    }
}

impl EvaluatorConfig {
    /// Sets the number of episodes.
    pub fn max_episodes(mut self, v: Option<usize>) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the interval of progress logs.
    pub fn log_interval(mut self, v: usize) -> Self {
        self.log_interval = v;
        self
    }

    /// Sets the path of the metrics file.
    pub fn metrics_path(mut self, v: Option<PathBuf>) -> Self {
        self.metrics_path = v;
        self
    }

    /// Constructs [`EvaluatorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EvaluatorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
