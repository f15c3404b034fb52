use crate::display::{DisplayCommand, DisplaySink, ScrollBehavior};
use crate::lrc::LyricSheet;

/// Per-frame highlight and auto-scroll.
///
/// Only emits `Highlight`/`ScrollToLine` when the active line changes, so
/// running it at frame rate is cheap for the sinks.
#[derive(Debug, Default)]
pub struct HighlightDriver {
    last_active: Option<usize>,
}

impl HighlightDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_active: None }
    }

    /// Advance one frame at estimated `position` (seconds).
    ///
    /// Progress is only reported for songs with a known `duration`.
    pub fn tick(
        &mut self,
        position: f64,
        duration: f64,
        sheet: &LyricSheet,
        sink: &mut impl DisplaySink,
    ) {
        if duration > 0.0 {
            let percent = (position / duration * 100.0).min(100.0);
            sink.apply(DisplayCommand::Progress { percent });
        }

        let active = sheet.active_index(position);
        if active == self.last_active {
            return;
        }
        self.last_active = active;

        sink.apply(DisplayCommand::Highlight { active });
        if let Some(index) = active {
            sink.apply(DisplayCommand::ScrollToLine {
                index,
                behavior: ScrollBehavior::Smooth,
            });
        }
    }

    /// Re-center the active line after the viewport changed size.
    pub fn on_resize(&self, sink: &mut impl DisplaySink) {
        if let Some(index) = self.last_active {
            sink.apply(DisplayCommand::ScrollToLine {
                index,
                behavior: ScrollBehavior::Instant,
            });
        }
    }

    /// Forget the active line so the next frame highlights from scratch.
    pub fn reset(&mut self) {
        self.last_active = None;
    }

    #[must_use]
    pub const fn last_active(&self) -> Option<usize> {
        self.last_active
    }
}
