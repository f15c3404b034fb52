use crate::coordinator::Session;
use crate::display::DisplayCommand;
use crate::error::{CoreError, Result};
use crate::message::InboundMessage;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const LOG_TARGET: &str = "synclyrics::engine";

/// Buffered display commands per subscriber before it starts lagging
const DISPLAY_CHANNEL_CAPACITY: usize = 256;

/// Work items for the engine task
#[derive(Debug, Clone)]
pub enum EngineInput {
    /// A decoded server message
    Message(InboundMessage),
    /// Shift the manual offset, in seconds
    AdjustOffset(f64),
    SetGameMode(bool),
    UpdateVisibility {
        show_header: bool,
        show_progress_bar: bool,
    },
    /// The lyric container changed size
    Resized,
    /// A display surface subscribed late or lagged; replay the current state
    Resync,
}

impl From<InboundMessage> for EngineInput {
    fn from(message: InboundMessage) -> Self {
        Self::Message(message)
    }
}

/// Cloneable sender side of the engine inbox.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<EngineInput>,
}

impl EngineHandle {
    /// Queue `input` for the engine. Inputs are applied in send order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EngineStopped`] if the engine task has exited.
    pub fn send(&self, input: impl Into<EngineInput>) -> Result<()> {
        self.tx
            .send(input.into())
            .map_err(|_| CoreError::EngineStopped)
    }
}

/// Owns the [`Session`] and drives it from one task.
///
/// Inbound messages, user actions and display frames are all handled inside
/// a single `select!` loop, so a frame never observes a half-applied update.
pub struct SyncEngine {
    session: Session,
    inbox: mpsc::UnboundedReceiver<EngineInput>,
    display_tx: broadcast::Sender<DisplayCommand>,
    frame_interval: Duration,
    cancel_token: CancellationToken,
}

impl SyncEngine {
    /// Create an engine and the handle used to feed it.
    #[must_use]
    pub fn new(
        session: Session,
        frame_interval: Duration,
        cancel_token: CancellationToken,
    ) -> (Self, EngineHandle) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let (display_tx, _) = broadcast::channel(DISPLAY_CHANNEL_CAPACITY);

        let engine = Self {
            session,
            inbox,
            display_tx,
            frame_interval,
            cancel_token,
        };
        (engine, EngineHandle { tx })
    }

    /// Subscribe to display commands
    pub fn subscribe(&self) -> broadcast::Receiver<DisplayCommand> {
        self.display_tx.subscribe()
    }

    /// Sender the engine publishes on; subscribe through it after the engine
    /// has been moved into its task.
    #[must_use]
    pub fn display_sender(&self) -> broadcast::Sender<DisplayCommand> {
        self.display_tx.clone()
    }

    /// Start the engine in a background task
    #[must_use]
    pub fn start(self) -> tokio::task::JoinHandle<Session> {
        tokio::spawn(self.run())
    }

    /// Run until cancelled or every [`EngineHandle`] is dropped, then hand
    /// back the session.
    pub async fn run(mut self) -> Session {
        info!(
            target: LOG_TARGET,
            "Sync engine running at {:?} per frame", self.frame_interval
        );

        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    info!(target: LOG_TARGET, "Sync engine shutting down");
                    break;
                }
                input = self.inbox.recv() => {
                    let Some(input) = input else {
                        info!(target: LOG_TARGET, "All engine handles dropped, stopping");
                        break;
                    };
                    Self::apply(&mut self.session, &mut self.display_tx, input);
                }
                _ = frames.tick() => {
                    self.session.tick(&mut self.display_tx);
                }
            }
        }

        self.session
    }

    fn apply(
        session: &mut Session,
        sink: &mut broadcast::Sender<DisplayCommand>,
        input: EngineInput,
    ) {
        match input {
            EngineInput::Message(message) => {
                debug!(target: LOG_TARGET, "Handling {} message", message.kind());
                session.handle(message, sink);
            }
            EngineInput::AdjustOffset(delta) => {
                session.adjust_offset(delta);
            }
            EngineInput::SetGameMode(enabled) => session.toggle_game_mode(enabled, sink),
            EngineInput::UpdateVisibility {
                show_header,
                show_progress_bar,
            } => session.update_visibility(show_header, show_progress_bar, sink),
            EngineInput::Resized => session.viewport_resized(sink),
            EngineInput::Resync => {
                debug!(target: LOG_TARGET, "Replaying display state");
                session.resync(sink);
            }
        }
    }
}
