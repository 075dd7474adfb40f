#![warn(missing_docs)]
//! WebSocket transport to the tractor simulator.
//!
//! [`WsConnector`] opens one client connection per call to
//! [`Connector::connect`](tractor_core::Connector::connect) and hands out a
//! [`WsChannel`] implementing [`Channel`](tractor_core::Channel). The channel
//! carries one JSON object per text message, never sends keepalive pings and
//! answers the pings of the peer.
//!
//! Blocking reads wake up every `poll_interval_millis` to look at the
//! [`StopSignal`](tractor_core::StopSignal), so an external stop abandons a
//! pending receive promptly.
mod channel;
mod config;
mod connector;
pub use channel::WsChannel;
pub use config::WsConfig;
pub use connector::WsConnector;
