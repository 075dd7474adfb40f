//! Translation between wire messages and the data model.
//!
//! Simulator to agent:
//!
//! ```json
//! {"observation": [0, 0, 0, 0, 0, 0, 0], "reward": 0.5, "done": false, "info": {"progress": 12.5}}
//! ```
//!
//! `reward` and `info` are absent on the first message of an episode, and a
//! missing `done` reads as `false`.
//!
//! Agent to simulator:
//!
//! ```json
//! {"acceleration": 0.7, "steering": -0.6, "brake": 0.0, "four_wheel_drive": false, "reset_episode": false}
//! ```
use crate::{error::DecodeError, Action, ActionFlags, Observation, OBS_DIM};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Auxiliary information attached to a state message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StepInfo {
    /// Completion of the course in percent.
    #[serde(default)]
    pub progress: Option<f32>,

    /// Any other field sent by the simulator.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A decoded state message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateMessage {
    /// Current observation.
    pub observation: Observation,

    /// Reward of the previous action; absent on the first message of an episode.
    #[serde(default)]
    pub reward: Option<f32>,

    /// Whether the episode ended.
    #[serde(default)]
    pub done: bool,

    /// Auxiliary information.
    #[serde(default)]
    pub info: Option<StepInfo>,
}

impl StateMessage {
    /// Progress reported in `info`, if any.
    pub fn progress(&self) -> Option<f32> {
        self.info.as_ref().and_then(|i| i.progress)
    }
}

/// Encodes actions and decodes state messages.
#[derive(Debug, Clone)]
pub struct StateCodec {
    obs_dim: usize,
}

impl Default for StateCodec {
    fn default() -> Self {
        Self::new(OBS_DIM)
    }
}

impl StateCodec {
    /// Creates a codec expecting observations of `obs_dim` features.
    pub fn new(obs_dim: usize) -> Self {
        Self { obs_dim }
    }

    /// Decodes a state message.
    pub fn decode(&self, raw: &str) -> Result<StateMessage, DecodeError> {
        let msg: StateMessage = serde_json::from_str(raw)?;
        if msg.observation.len() != self.obs_dim {
            return Err(DecodeError::ObservationArity {
                expected: self.obs_dim,
                actual: msg.observation.len(),
            });
        }
        Ok(msg)
    }

    /// Encodes an action message.
    ///
    /// The action is expected to be in range already.
    pub fn encode(&self, action: &Action, flags: ActionFlags) -> String {
        json!({
            "acceleration": action.acceleration,
            "steering": action.steering,
            "brake": action.brake,
            "four_wheel_drive": flags.four_wheel_drive,
            "reset_episode": flags.reset_episode,
        })
        .to_string()
    }
}
