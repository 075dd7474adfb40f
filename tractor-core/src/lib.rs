#![warn(missing_docs)]
//! Closed-loop reinforcement learning of a tractor driven in a remote simulator.
//!
//! The simulator and the agent exchange one JSON object per message over a
//! persistent [`Channel`]. The [`EpisodeController`] drives training episodes:
//! it receives an observation, asks the [`TractorAgent`] for an action, sends
//! it, stores the resulting [`Transition`] in the [`ReplayBuffer`] and lets the
//! [`Trainer`] update the model. The [`Evaluator`] runs a trained policy
//! without learning.
//!
//! The learned model is a black box behind [`QModel`]; the transport is behind
//! [`Connector`]. Both are implemented in separate crates.
pub mod agent;
pub mod codec;
pub mod dummy;
pub mod error;
pub mod record;
pub mod replay_buffer;
pub mod util;

mod base;
pub use base::{
    Action, ActionFlags, ActionValues, Agent, Channel, Connector, ExperienceBufferBase,
    Observation, Policy, QModel, ReplayBufferBase, Transition, ACCELERATION_RANGE, BRAKE_RANGE,
    OBS_DIM, STEERING_RANGE,
};

pub use agent::{AgentConfig, TractorAgent};
pub use codec::{StateCodec, StateMessage};
pub use replay_buffer::{ReplayBuffer, ReplayBufferConfig};
pub use util::StopSignal;

mod trainer;
pub use trainer::{Trainer, TrainerConfig};

mod controller;
pub use controller::{
    ControllerConfig, ControllerState, ControllerStats, EpisodeController, FailureReason,
    ReconnectPolicy,
};

mod evaluator;
pub use evaluator::{Evaluator, EvaluatorConfig};
