//! States of the episode controller.
use crate::error::ChannelError;
use std::fmt;
use thiserror::Error;

/// Why an episode attempt failed.
#[derive(Error, Debug)]
pub enum FailureReason {
    /// The transport failed or the peer closed the connection.
    #[error("transport failure: {0}")]
    Transport(#[from] ChannelError),

    /// Anything else went wrong in the episode, typically the model.
    #[error("episode failure: {0}")]
    Episode(anyhow::Error),
}

/// State of the [`EpisodeController`](super::EpisodeController).
#[derive(Debug)]
pub enum ControllerState {
    /// Opening the channel.
    Connecting,

    /// Waiting for the first message of an episode.
    AwaitingObservation,

    /// Choosing and sending an action.
    Acting,

    /// Waiting for the outcome of the sent action.
    AwaitingResult,

    /// Finalizing the episode.
    EpisodeDone,

    /// Waiting out the backoff after a failed attempt.
    Reconnecting(FailureReason),

    /// The run is over.
    Finished,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "CONNECTING"),
            Self::AwaitingObservation => write!(f, "AWAITING_OBSERVATION"),
            Self::Acting => write!(f, "ACTING"),
            Self::AwaitingResult => write!(f, "AWAITING_RESULT"),
            Self::EpisodeDone => write!(f, "EPISODE_DONE"),
            Self::Reconnecting(_) => write!(f, "RECONNECTING"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}
