//! Per-episode metrics of a run.
use super::{Record, RecordValue};
use crate::error::RecordError;
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fs::File, path::Path};

/// Scalar summary of one finished episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// One-based index of the episode in the run.
    pub episode: usize,

    /// Sum of the rewards received in the episode.
    pub total_reward: f32,

    /// Number of steps taken.
    pub step_count: usize,

    /// Exploration rate in effect during the episode.
    pub final_epsilon: f64,

    /// Largest `info.progress` reported by the simulator.
    pub max_progress: f32,

    /// Mean loss of the optimization steps of the episode, if any ran.
    pub mean_loss: Option<f32>,
}

impl From<&EpisodeSummary> for Record {
    fn from(s: &EpisodeSummary) -> Self {
        let mut record = Record::from_slice(&[
            ("episode", RecordValue::Scalar(s.episode as f32)),
            ("total_reward", RecordValue::Scalar(s.total_reward)),
            ("step_count", RecordValue::Scalar(s.step_count as f32)),
            ("epsilon", RecordValue::Scalar(s.final_epsilon as f32)),
            ("max_progress", RecordValue::Scalar(s.max_progress)),
        ]);
        if let Some(loss) = s.mean_loss {
            record.insert("mean_loss", RecordValue::Scalar(loss));
        }
        record
    }
}

impl TryFrom<&Record> for EpisodeSummary {
    type Error = RecordError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let mean_loss = record.get_scalar("mean_loss").ok();
        Ok(Self {
            episode: record.get_scalar("episode")? as usize,
            total_reward: record.get_scalar("total_reward")?,
            step_count: record.get_scalar("step_count")? as usize,
            final_epsilon: record.get_scalar("epsilon")? as f64,
            max_progress: record.get_scalar("max_progress")?,
            mean_loss,
        })
    }
}

/// Averages over the most recent episodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Number of episodes averaged.
    pub n_episodes: usize,

    /// Mean total reward.
    pub mean_reward: f32,

    /// Mean of the maximum progress.
    pub mean_progress: f32,
}

/// Accumulates [`EpisodeSummary`]s at episode boundaries.
///
/// Summaries are never modified once pushed.
#[derive(Debug, Default, Clone)]
pub struct MetricsRecorder {
    history: Vec<EpisodeSummary>,
}

impl MetricsRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the summary of a finished episode.
    pub fn push(&mut self, summary: EpisodeSummary) {
        self.history.push(summary);
    }

    /// All summaries in episode order.
    pub fn history(&self) -> &[EpisodeSummary] {
        &self.history
    }

    /// Number of recorded episodes.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns `true` if no episode was recorded.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Averages over the last `n` episodes, or fewer if fewer were recorded.
    pub fn window_stats(&self, n: usize) -> Option<WindowStats> {
        let start = self.history.len().saturating_sub(n);
        let window = &self.history[start..];
        if window.is_empty() {
            return None;
        }
        let k = window.len() as f32;
        Some(WindowStats {
            n_episodes: window.len(),
            mean_reward: window.iter().map(|s| s.total_reward).sum::<f32>() / k,
            mean_progress: window.iter().map(|s| s.max_progress).sum::<f32>() / k,
        })
    }

    /// The first episode with the highest total reward.
    pub fn best_episode(&self) -> Option<&EpisodeSummary> {
        self.history.iter().fold(None, |best, s| match best {
            Some(b) if b.total_reward >= s.total_reward => Some(b),
            _ => Some(s),
        })
    }

    /// Mean total reward over the whole run.
    pub fn mean_reward(&self) -> Option<f32> {
        self.window_stats(self.history.len()).map(|w| w.mean_reward)
    }

    /// Highest progress reached in any episode.
    pub fn best_progress(&self) -> Option<f32> {
        self.history
            .iter()
            .map(|s| s.max_progress)
            .fold(None, |m, p| Some(m.map_or(p, |m: f32| m.max(p))))
    }

    /// Writes the history as CSV, one row per episode.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(File::create(path.as_ref())?);
        for summary in self.history.iter() {
            wtr.serialize(summary)?;
        }
        wtr.flush()?;
        info!("Saved metrics of {} episodes to {:?}", self.len(), path.as_ref());
        Ok(())
    }
}
