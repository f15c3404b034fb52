//! WebSocket connection to the lyrics server.

use crate::config::WebSocketConfig;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use synclyrics_core::{CoreError, EngineHandle, InboundMessage, MessageSource};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const LOG_TARGET: &str = "synclyrics::socket";

/// Read-only websocket client implementing [`MessageSource`].
///
/// Decoded messages are forwarded to the engine in arrival order. The
/// connection is re-established forever after a fixed delay.
pub struct LyricsSocket {
    url: String,
    reconnect_delay: Duration,
    engine: EngineHandle,
    cancel_token: CancellationToken,
}

impl LyricsSocket {
    /// Create a new socket client
    ///
    /// # Arguments
    /// * `config` - Endpoint and reconnect delay
    /// * `engine` - Handle the decoded messages are sent to
    /// * `cancel_token` - Optional external cancellation token for graceful shutdown
    pub fn new(
        config: &WebSocketConfig,
        engine: EngineHandle,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        Self {
            url: config.url.clone(),
            reconnect_delay: config.reconnect_delay(),
            engine,
            cancel_token: cancel_token.unwrap_or_default(),
        }
    }

    /// Start the client in a background task
    #[must_use]
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run().await {
                error!(target: LOG_TARGET, "Websocket client stopped with error: {}", e);
            }
        })
    }

    /// Hold one connection until the server closes it.
    ///
    /// Returns `Ok` when the server closed the socket cleanly.
    async fn connect_once(&self) -> Result<()> {
        let (mut stream, _) = connect_async(self.url.as_str()).await?;
        info!(target: LOG_TARGET, "Connected to {}", self.url);

        while let Some(frame) = stream.next().await {
            match frame? {
                Message::Text(text) => self.forward(text.as_str())?,
                Message::Close(frame) => {
                    debug!(target: LOG_TARGET, "Close frame: {:?}", frame);
                    break;
                }
                // Control frames are answered by tungstenite; binary is unused
                _ => {}
            }
        }
        Ok(())
    }

    /// Decode one text frame and hand it to the engine.
    fn forward(&self, text: &str) -> Result<()> {
        match InboundMessage::from_json(text) {
            Ok(message) => {
                debug!(target: LOG_TARGET, "Received {} message", message.kind());
                self.engine.send(message)?;
            }
            Err(e) => warn!(target: LOG_TARGET, "Dropping malformed frame: {}", e),
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSource for LyricsSocket {
    fn name(&self) -> &'static str {
        "websocket"
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    async fn run(&self) -> synclyrics_core::error::Result<()> {
        info!(target: LOG_TARGET, "Starting websocket client for {}", self.url);

        let mut consecutive_failures: u32 = 0;

        loop {
            let outcome = tokio::select! {
                () = self.cancel_token.cancelled() => break,
                outcome = self.connect_once() => outcome,
            };

            match outcome {
                Ok(()) => {
                    consecutive_failures = 0;
                    info!(
                        target: LOG_TARGET,
                        "Server closed the connection, reconnecting in {:?}", self.reconnect_delay
                    );
                }
                Err(ClientError::Core(CoreError::EngineStopped)) => {
                    info!(target: LOG_TARGET, "Sync engine stopped, closing websocket client");
                    break;
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    if consecutive_failures == 1 {
                        warn!(
                            target: LOG_TARGET,
                            "Connection lost: {}, reconnecting every {:?}", e, self.reconnect_delay
                        );
                    } else {
                        debug!(
                            target: LOG_TARGET,
                            "Reconnect attempt {} failed: {}", consecutive_failures, e
                        );
                    }
                }
            }

            tokio::select! {
                () = self.cancel_token.cancelled() => break,
                () = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        info!(target: LOG_TARGET, "Websocket client shutting down");
        Ok(())
    }
}
