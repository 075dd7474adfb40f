//! Training run driven episode by episode over the transport.
mod base;
mod config;
mod state;
pub use base::{ControllerStats, EpisodeController};
pub use config::{ControllerConfig, ReconnectPolicy};
pub use state::{ControllerState, FailureReason};
