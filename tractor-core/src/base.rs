//! Core functionalities.
mod act;
mod agent;
mod channel;
mod model;
mod obs;
mod policy;
mod replay_buffer;
mod transition;
pub use act::{Action, ActionFlags, ACCELERATION_RANGE, BRAKE_RANGE, STEERING_RANGE};
pub use agent::Agent;
pub use channel::{Channel, Connector};
pub use model::{ActionValues, QModel};
pub use obs::{Observation, OBS_DIM};
pub use policy::Policy;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use transition::Transition;
