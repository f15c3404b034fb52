//! WebSocket transport configuration.

use const_format::concatcp;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use synclyrics_core::{CoreError, TransportsConfig};

/// Transport name used in config file
pub const TRANSPORT_NAME: &str = "websocket";

/// Backend websocket route
pub const DEFAULT_URL: &str = "ws://localhost:8080/ws";

/// Fixed delay between reconnect attempts
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;

/// WebSocket-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// Server endpoint, `ws://` or `wss://`
    #[serde(default = "default_url")]
    pub url: String,
    /// Delay before reconnecting after the connection drops or fails
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
}

fn default_url() -> String {
    DEFAULT_URL.into()
}

const fn default_reconnect_delay() -> u64 {
    DEFAULT_RECONNECT_DELAY_MS
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_delay_ms: default_reconnect_delay(),
        }
    }
}

impl WebSocketConfig {
    /// Extract websocket config from the dynamic transport tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be parsed.
    pub fn from_transports(transports: &TransportsConfig) -> Result<Option<Self>, CoreError> {
        transports.get(TRANSPORT_NAME)
    }

    /// Validate the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or not a websocket URL.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.url.trim().is_empty() {
            return Err(CoreError::ConfigMissingField {
                field: "transport.websocket.url".into(),
            });
        }
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "transport.websocket.url must start with ws:// or wss://, got {}",
                    self.url
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Config template for the websocket transport.
/// This is appended to the base config template when creating a new config file.
pub const CONFIG_TEMPLATE: &str = concatcp!(
    "[transport.websocket]\n",
    "# Backend websocket endpoint\n",
    "url = \"",
    DEFAULT_URL,
    "\"\n",
    "# Fixed delay before reconnecting (milliseconds)\n",
    "reconnect_delay_ms = ",
    DEFAULT_RECONNECT_DELAY_MS,
    "\n"
);
