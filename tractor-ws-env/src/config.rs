//! Configuration of the WebSocket transport.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    time::Duration,
};

/// Configuration of [`WsConnector`](crate::WsConnector).
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct WsConfig {
    /// Address of the simulator.
    pub url: String,

    /// Largest accepted message in bytes.
    pub max_message_size: usize,

    /// How long closing waits for the close handshake, in milliseconds.
    pub close_timeout_millis: u64,

    /// Interval at which blocking reads check the stop signal, in milliseconds.
    pub poll_interval_millis: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8765".to_string(),
            max_message_size: 1 << 20,
            close_timeout_millis: 1000,
            poll_interval_millis: 100,
        }
    }
}

impl WsConfig {
    /// Sets the address of the simulator.
    pub fn url(mut self, v: impl Into<String>) -> Self {
        self.url = v.into();
        self
    }

    /// Sets the largest accepted message.
    pub fn max_message_size(mut self, v: usize) -> Self {
        self.max_message_size = v;
        self
    }

    /// Sets the close timeout in milliseconds.
    pub fn close_timeout_millis(mut self, v: u64) -> Self {
        self.close_timeout_millis = v;
        self
    }

    /// Sets the poll interval in milliseconds.
    pub fn poll_interval_millis(mut self, v: u64) -> Self {
        self.poll_interval_millis = v;
        self
    }

    pub(crate) fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_millis)
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        // A zero read timeout is rejected by the socket.
        Duration::from_millis(self.poll_interval_millis.max(1))
    }

    /// Constructs [`WsConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`WsConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn defaults_point_at_the_local_simulator() -> Result<()> {
        let config = WsConfig::default();
        assert_eq!(config.url, "ws://localhost:8765");
        assert_eq!(config.max_message_size, 1048576);
        assert_eq!(config.close_timeout(), Duration::from_secs(1));

        let dir = TempDir::new("ws_config")?;
        let path = dir.path().join("ws.yaml");
        let config = config.url("ws://127.0.0.1:9000").poll_interval_millis(0);
        config.save(&path)?;
        let loaded = WsConfig::load(&path)?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.poll_interval(), Duration::from_millis(1));
        Ok(())
    }
}
