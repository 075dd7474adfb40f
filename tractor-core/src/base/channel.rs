//! Transport to the simulator.
use crate::error::ChannelError;

/// A persistent, message oriented, full duplex connection to the simulator.
///
/// Every message is one JSON object. Sends and receives alternate in lockstep;
/// nothing is pipelined.
pub trait Channel {
    /// Sends one message.
    ///
    /// Fails with [`ChannelError::Closed`] if the peer disconnected.
    fn send(&mut self, message: &str) -> Result<(), ChannelError>;

    /// Blocks until a message arrives.
    ///
    /// Fails with [`ChannelError::Closed`] when the peer closes the connection,
    /// [`ChannelError::Protocol`] on a payload that is not a text message and
    /// [`ChannelError::Cancelled`] when a stop was requested while waiting.
    fn receive(&mut self) -> Result<String, ChannelError>;

    /// Closes the connection. Errors are ignored.
    fn close(&mut self);
}

/// Opens [`Channel`]s to a fixed address.
pub trait Connector {
    /// The channel produced by this connector.
    type Channel: Channel;

    /// Opens a new connection.
    fn connect(&mut self) -> Result<Self::Channel, ChannelError>;
}
