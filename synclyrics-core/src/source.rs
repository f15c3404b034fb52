//! Message source trait.

use crate::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A connection that delivers server messages to the engine.
///
/// Implementations should:
///
/// - Decode inbound frames and forward them through an
///   [`EngineHandle`](crate::EngineHandle), preserving arrival order
/// - Drop frames that fail to decode without stopping
/// - Reconnect on connection loss until cancelled
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Human-readable transport name, used in logs.
    fn name(&self) -> &'static str;

    /// Run until the cancellation token fires or the engine stops.
    ///
    /// # Errors
    ///
    /// Returns an error only for unrecoverable failures. Connection loss
    /// is not one of them.
    async fn run(&self) -> Result<()>;

    /// Token used to signal shutdown.
    fn cancel_token(&self) -> CancellationToken;

    /// Signal the source to stop.
    fn stop(&self) {
        self.cancel_token().cancel();
    }
}
