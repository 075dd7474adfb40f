//! A connection to the simulator.
use log::{debug, trace, warn};
use std::{
    io::ErrorKind,
    net::TcpStream,
    time::{Duration, Instant},
};
use tractor_core::{error::ChannelError, Channel, StopSignal};
use tungstenite::{stream::MaybeTlsStream, Error, Message, WebSocket};

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

fn channel_error(e: Error) -> ChannelError {
    match e {
        Error::ConnectionClosed | Error::AlreadyClosed => ChannelError::Closed,
        Error::Io(e) => ChannelError::Io(e),
        e => ChannelError::Protocol(e.to_string()),
    }
}

/// A WebSocket connection carrying one JSON object per text message.
pub struct WsChannel {
    socket: Socket,
    stop: StopSignal,
    close_timeout: Duration,
}

impl WsChannel {
    pub(crate) fn new(socket: Socket, stop: StopSignal, close_timeout: Duration) -> Self {
        Self {
            socket,
            stop,
            close_timeout,
        }
    }
}

impl Channel for WsChannel {
    fn send(&mut self, message: &str) -> Result<(), ChannelError> {
        trace!("Send: {}", message);
        self.socket
            .send(Message::Text(message.to_string()))
            .map_err(channel_error)
    }

    fn receive(&mut self) -> Result<String, ChannelError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => {
                    trace!("Receive: {}", text);
                    return Ok(text);
                }
                Ok(Message::Binary(bytes)) => {
                    return String::from_utf8(bytes).map_err(|e| {
                        ChannelError::Protocol(format!("Non UTF-8 binary message: {}", e))
                    })
                }
                Ok(Message::Ping(_)) => {
                    // The pong is queued by the socket.
                    match self.socket.flush() {
                        Ok(()) => {}
                        Err(Error::Io(e)) if is_timeout(&e) => {}
                        Err(e) => return Err(channel_error(e)),
                    }
                }
                Ok(Message::Close(frame)) => {
                    debug!("Close frame from the peer: {:?}", frame);
                    return Err(ChannelError::Closed);
                }
                Ok(_) => {}
                Err(Error::Io(e)) if is_timeout(&e) => {
                    if self.stop.is_stopped() {
                        return Err(ChannelError::Cancelled);
                    }
                }
                Err(e) => return Err(channel_error(e)),
            }
        }
    }

    fn close(&mut self) {
        if let Err(e) = self.socket.close(None) {
            debug!("Close: {}", e);
            return;
        }
        let deadline = Instant::now() + self.close_timeout;
        while Instant::now() < deadline {
            match self.socket.read() {
                Ok(_) => {}
                Err(Error::Io(e)) if is_timeout(&e) => {}
                Err(Error::ConnectionClosed) | Err(Error::AlreadyClosed) => return,
                Err(e) => {
                    debug!("Close handshake: {}", e);
                    return;
                }
            }
        }
        warn!("Close handshake timed out after {:?}", self.close_timeout);
    }
}
