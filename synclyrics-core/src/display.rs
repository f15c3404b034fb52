//! Commands the core writes to the rendering surface.

use crate::lrc::LyricLine;
use std::sync::Arc;
use tokio::sync::broadcast;

/// How the lyric container should move to a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Animated scroll, used when the active line advances
    Smooth,
    /// Jump, used after viewport resizes
    Instant,
}

impl ScrollBehavior {
    /// Value of the DOM `ScrollToOptions.behavior` field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Instant => "instant",
        }
    }
}

/// Visual state of one lyric line relative to the active line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Active,
    Past,
    Upcoming,
}

impl LineState {
    /// State of line `index` when `active` is highlighted.
    #[must_use]
    pub fn of(index: usize, active: Option<usize>) -> Self {
        match active {
            Some(a) if index == a => Self::Active,
            Some(a) if index < a => Self::Past,
            _ => Self::Upcoming,
        }
    }
}

/// Cinema layout geometry, forwarded as CSS custom properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CinemaGeometry {
    pub screen_width: f64,
    pub screen_height: f64,
    pub screen_opacity: f64,
}

/// What to show behind the lyrics
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    None,
    /// Album art from the update message
    Artwork { url: String },
    /// Cinema mode media (image or video)
    Cinema {
        url: String,
        geometry: CinemaGeometry,
    },
}

/// A single write to the display sinks
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    /// Title and artist for the header and footer
    TrackText { title: String, artist: String },
    Background(Background),
    /// Header/footer and progress bar visibility
    Chrome {
        show_header: bool,
        show_progress_bar: bool,
    },
    /// Word masking switched on or off
    GameMode { enabled: bool },
    /// Replace every rendered line
    RenderLines(Arc<[LyricLine]>),
    /// Line `active` is current, earlier lines are past, later lines are
    /// neither. `None` clears all line state.
    Highlight { active: Option<usize> },
    /// Progress bar width, 0 to 100
    Progress { percent: f64 },
    /// Vertically center line `index` in the lyric container
    ScrollToLine {
        index: usize,
        behavior: ScrollBehavior,
    },
    /// Scroll the lyric container back to the top
    ResetScroll,
}

/// Receiver of display commands.
pub trait DisplaySink {
    fn apply(&mut self, command: DisplayCommand);
}

/// Collects commands in order; handy for inspecting what the core emitted.
impl DisplaySink for Vec<DisplayCommand> {
    fn apply(&mut self, command: DisplayCommand) {
        self.push(command);
    }
}

/// Publishes commands to every subscribed surface. Commands sent while no
/// surface is subscribed are dropped.
impl DisplaySink for broadcast::Sender<DisplayCommand> {
    fn apply(&mut self, command: DisplayCommand) {
        let _ = self.send(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_state_of() {
        assert_eq!(LineState::of(0, Some(2)), LineState::Past);
        assert_eq!(LineState::of(2, Some(2)), LineState::Active);
        assert_eq!(LineState::of(3, Some(2)), LineState::Upcoming);
        assert_eq!(LineState::of(0, None), LineState::Upcoming);
    }

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink: Vec<DisplayCommand> = Vec::new();
        sink.apply(DisplayCommand::ResetScroll);
        sink.apply(DisplayCommand::Progress { percent: 5.0 });
        assert_eq!(
            sink,
            vec![
                DisplayCommand::ResetScroll,
                DisplayCommand::Progress { percent: 5.0 }
            ]
        );
    }

    #[test]
    fn test_broadcast_sink_without_subscribers_is_silent() {
        let (mut tx, _) = broadcast::channel::<DisplayCommand>(4);
        tx.apply(DisplayCommand::ResetScroll);
    }

    #[tokio::test]
    async fn test_broadcast_sink_delivers() {
        let (mut tx, mut rx) = broadcast::channel::<DisplayCommand>(4);
        tx.apply(DisplayCommand::Highlight { active: Some(1) });
        assert_eq!(
            rx.recv().await.unwrap(),
            DisplayCommand::Highlight { active: Some(1) }
        );
    }
}
