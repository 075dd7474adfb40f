//! Opening connections to the simulator.
use crate::{WsChannel, WsConfig};
use log::{debug, info};
use tractor_core::{error::ChannelError, Connector, StopSignal};
use tungstenite::{client::connect_with_config, protocol::WebSocketConfig, stream::MaybeTlsStream};

/// Opens [`WsChannel`]s to the address of [`WsConfig`].
pub struct WsConnector {
    config: WsConfig,
    stop: StopSignal,
}

impl WsConnector {
    /// Constructs a connector.
    pub fn build(config: WsConfig) -> Self {
        Self {
            config,
            stop: StopSignal::new(),
        }
    }

    /// Sets the stop signal that cancels pending receives.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    fn ws_config(&self) -> WebSocketConfig {
        let mut config = WebSocketConfig::default();
        config.max_message_size = Some(self.config.max_message_size);
        config
    }
}

impl Connector for WsConnector {
    type Channel = WsChannel;

    fn connect(&mut self) -> Result<Self::Channel, ChannelError> {
        debug!("Connecting to {}", self.config.url);
        let (socket, response) =
            connect_with_config(self.config.url.as_str(), Some(self.ws_config()), 3)
                .map_err(|e| ChannelError::Connect(format!("{}: {}", self.config.url, e)))?;
        debug!("Handshake response status: {}", response.status());

        match socket.get_ref() {
            MaybeTlsStream::Plain(stream) => {
                stream.set_read_timeout(Some(self.config.poll_interval()))?;
                stream.set_nodelay(true)?;
            }
            _ => {
                return Err(ChannelError::Connect(format!(
                    "{}: only plain ws:// connections are supported",
                    self.config.url
                )))
            }
        }

        info!("WebSocket connection to {} established", self.config.url);
        Ok(WsChannel::new(
            socket,
            self.stop.clone(),
            self.config.close_timeout(),
        ))
    }
}
