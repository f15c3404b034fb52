use dioxus::prelude::*;
use std::sync::Arc;
use synclyrics_core::{Background, DisplayCommand, LyricLine};

/// Display state mirrored from the engine's commands.
///
/// Each field is its own signal so a progress tick only re-renders the
/// progress bar, not the lyric list.
#[derive(Clone, Copy)]
pub struct LyricsState {
    pub title: Signal<String>,
    pub artist: Signal<String>,
    pub background: Signal<Background>,
    pub show_header: Signal<bool>,
    pub show_progress_bar: Signal<bool>,
    pub game_mode: Signal<bool>,
    pub lines: Signal<Arc<[LyricLine]>>,
    pub active: Signal<Option<usize>>,
    /// 0 to 100
    pub progress: Signal<f64>,
    /// Sum of the offset button presses, in seconds
    pub manual_offset: Signal<f64>,
}

impl LyricsState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: Signal::new(String::new()),
            artist: Signal::new(String::new()),
            background: Signal::new(Background::None),
            show_header: Signal::new(true),
            show_progress_bar: Signal::new(true),
            game_mode: Signal::new(false),
            lines: Signal::new(Arc::from(Vec::new())),
            active: Signal::new(None),
            progress: Signal::new(0.0),
            manual_offset: Signal::new(0.0),
        }
    }

    /// Apply a state-changing command. Scroll commands are not state and are
    /// left to the caller.
    pub fn apply(&mut self, command: DisplayCommand) {
        match command {
            DisplayCommand::TrackText { title, artist } => {
                self.title.set(title);
                self.artist.set(artist);
            }
            DisplayCommand::Background(background) => {
                // Re-setting would restart a playing cinema video
                if *self.background.peek() != background {
                    self.background.set(background);
                }
            }
            DisplayCommand::Chrome {
                show_header,
                show_progress_bar,
            } => {
                self.show_header.set(show_header);
                self.show_progress_bar.set(show_progress_bar);
            }
            DisplayCommand::GameMode { enabled } => self.game_mode.set(enabled),
            DisplayCommand::RenderLines(lines) => self.lines.set(lines),
            DisplayCommand::Highlight { active } => self.active.set(active),
            DisplayCommand::Progress { percent } => self.progress.set(percent),
            DisplayCommand::ScrollToLine { .. } | DisplayCommand::ResetScroll => {}
        }
    }
}

impl Default for LyricsState {
    fn default() -> Self {
        Self::new()
    }
}
