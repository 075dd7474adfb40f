//! Errors in the library.
use thiserror::Error;

/// Errors raised by a [`Channel`](crate::Channel) or a [`Connector`](crate::Connector).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The peer closed the connection.
    #[error("Channel closed by the peer")]
    Closed,

    /// The connection could not be established.
    #[error("Failed to connect: {0}")]
    Connect(String),

    /// The peer sent something that is not a message of the protocol.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The operation was abandoned because a stop was requested.
    #[error("Cancelled by a stop request")]
    Cancelled,

    /// Low level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in decoding a state message.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Not valid JSON, or a required field such as `observation` is missing.
    #[error("Malformed state message: {0}")]
    Json(#[from] serde_json::Error),

    /// The observation does not have the expected number of features.
    #[error("Observation has {actual} features, expected {expected}")]
    ObservationArity {
        /// Configured arity.
        expected: usize,
        /// Arity of the received observation.
        actual: usize,
    },
}

/// Errors in the replay buffer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReplayBufferError {
    /// Fewer transitions are stored than requested.
    #[error("Requested {requested} transitions, but only {available} are stored")]
    InsufficientData {
        /// Requested batch size.
        requested: usize,
        /// Number of stored transitions.
        available: usize,
    },
}

/// Errors in accessing a [`Record`](crate::record::Record).
#[derive(Error, Debug)]
pub enum RecordError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),
}

/// Errors that end a run of the episode controller or the evaluator.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The bounded retry policy gave up after consecutive failed attempts.
    #[error("Gave up after {attempts} consecutive failed attempts: {last}")]
    RetriesExhausted {
        /// Number of consecutive failed attempts.
        attempts: usize,
        /// Description of the last failure.
        last: String,
    },

    /// The transport failed in a mode that does not reconnect.
    #[error("Transport failure: {0}")]
    Transport(#[from] ChannelError),

    /// The model or the metrics could not be written at the end of the run.
    #[error("Failed to persist the results of the run: {0}")]
    Persist(anyhow::Error),
}
