//! Session state and the update coordinator.

use crate::clock::Clock;
use crate::display::{DisplayCommand, DisplaySink};
use crate::driver::HighlightDriver;
use crate::lrc::{LrcMetadata, LyricSheet, Timing};
use crate::mask::WordMasker;
use crate::message::{DisplayOptions, InboundMessage, SongData, SyncData};
use crate::playback::PositionEstimator;
use std::sync::Arc;
use tracing::{debug, info};

/// The song the server last announced
#[derive(Debug, Clone, PartialEq)]
pub struct SongContext {
    pub title: String,
    pub artist: String,
    /// Seconds, 0 when unknown
    pub duration: f64,
    pub image: Option<String>,
    /// Lyrics exactly as received; re-parsing is keyed on this
    pub raw_lyrics: Option<String>,
    pub options: DisplayOptions,
}

impl SongContext {
    /// Build from an update, filling gaps from the lyrics' ID tags.
    fn from_update(data: &SongData, options: DisplayOptions, tags: &LrcMetadata) -> Self {
        Self {
            title: data.title_or(tags.title.as_deref()).to_string(),
            artist: data.artist_or(tags.artist.as_deref()).to_string(),
            duration: data.duration_or(tags.length),
            image: data.image.clone(),
            raw_lyrics: data.lyrics.clone(),
            options,
        }
    }
}

/// Everything the client knows about the current song and playback.
///
/// All mutation goes through `&mut self`, so a handler always finishes
/// before the next frame sees the state.
#[derive(Debug)]
pub struct Session {
    song: Option<SongContext>,
    sheet: LyricSheet,
    game_mode: bool,
    masker: WordMasker,
    estimator: PositionEstimator,
    driver: HighlightDriver,
}

impl Session {
    /// Empty session; nothing is rendered until the first update.
    pub fn new(clock: Arc<dyn Clock>, auto_offset: f64) -> Self {
        Self {
            song: None,
            sheet: LyricSheet {
                metadata: LrcMetadata::default(),
                lines: Vec::new(),
                timing: Timing::NotFound,
            },
            game_mode: false,
            masker: WordMasker::new(),
            estimator: PositionEstimator::new(clock, auto_offset),
            driver: HighlightDriver::new(),
        }
    }

    /// Replace the masker's random source.
    #[must_use]
    pub fn with_masker(mut self, masker: WordMasker) -> Self {
        self.masker = masker;
        self
    }

    /// Apply one inbound message.
    pub fn handle(&mut self, message: InboundMessage, sink: &mut impl DisplaySink) {
        match message {
            InboundMessage::Update { data, options } => self.apply_update(&data, options, sink),
            InboundMessage::Sync { data } => self.apply_sync(&data),
        }
    }

    /// Apply a full song-state update.
    ///
    /// Lyrics are re-parsed only when the raw text or the game mode changed.
    /// Scroll and highlight restart from the top on every update, and the
    /// embedded sync is always applied.
    pub fn apply_update(
        &mut self,
        data: &SongData,
        options: DisplayOptions,
        sink: &mut impl DisplaySink,
    ) {
        let lyrics_changed = self
            .song
            .as_ref()
            .map_or(true, |current| current.raw_lyrics != data.lyrics);
        let game_mode_changed = options.game_mode_enabled != self.game_mode;

        self.game_mode = options.game_mode_enabled;
        let reparse = lyrics_changed || game_mode_changed;
        if reparse {
            self.parse(data.lyrics.as_deref());
        }

        let song = SongContext::from_update(data, options, &self.sheet.metadata);
        if lyrics_changed {
            info!("Now playing: {} - {}", song.artist, song.title);
        }

        sink.apply(DisplayCommand::TrackText {
            title: song.title.clone(),
            artist: song.artist.clone(),
        });
        sink.apply(DisplayCommand::Background(
            song.options.background(song.image.as_deref()),
        ));
        sink.apply(DisplayCommand::Chrome {
            show_header: song.options.show_header,
            show_progress_bar: song.options.show_progress_bar,
        });
        if game_mode_changed {
            sink.apply(DisplayCommand::GameMode {
                enabled: self.game_mode,
            });
        }
        self.song = Some(song);

        if reparse {
            self.render(sink);
        }
        self.reset_view(sink);

        self.apply_sync(&data.sync());
    }

    /// Replace the playback snapshot.
    pub fn apply_sync(&mut self, data: &SyncData) {
        let kind = self.estimator.sync(data.position_secs(), data.is_playing());
        debug!(
            "Sync {:?} at {:.2}s (playing: {})",
            kind,
            data.position_secs(),
            data.is_playing()
        );
    }

    /// Shift the manual offset by `delta` seconds. Returns the new offset.
    pub fn adjust_offset(&mut self, delta: f64) -> f64 {
        let offset = self.estimator.adjust_offset(delta);
        info!("Manual offset now {:+.2}s", offset);
        offset
    }

    /// Turn word masking on or off and re-render from the raw lyrics.
    pub fn toggle_game_mode(&mut self, enabled: bool, sink: &mut impl DisplaySink) {
        if enabled == self.game_mode {
            return;
        }
        info!("Game mode {}", if enabled { "enabled" } else { "disabled" });

        self.game_mode = enabled;
        if let Some(song) = self.song.as_mut() {
            song.options.game_mode_enabled = enabled;
        }
        sink.apply(DisplayCommand::GameMode { enabled });

        let raw = self.song.as_ref().and_then(|song| song.raw_lyrics.clone());
        self.parse(raw.as_deref());
        self.render(sink);
        self.reset_view(sink);
    }

    /// Show or hide the header/footer and progress bar.
    pub fn update_visibility(
        &mut self,
        show_header: bool,
        show_progress_bar: bool,
        sink: &mut impl DisplaySink,
    ) {
        if let Some(song) = self.song.as_mut() {
            song.options.show_header = show_header;
            song.options.show_progress_bar = show_progress_bar;
        }
        sink.apply(DisplayCommand::Chrome {
            show_header,
            show_progress_bar,
        });
    }

    pub fn viewport_resized(&self, sink: &mut impl DisplaySink) {
        self.driver.on_resize(sink);
    }

    /// Re-emit the full display state for a surface that missed commands.
    ///
    /// Progress is left to the next frame.
    pub fn resync(&self, sink: &mut impl DisplaySink) {
        sink.apply(DisplayCommand::GameMode {
            enabled: self.game_mode,
        });
        let Some(song) = self.song.as_ref() else {
            return;
        };

        sink.apply(DisplayCommand::TrackText {
            title: song.title.clone(),
            artist: song.artist.clone(),
        });
        sink.apply(DisplayCommand::Background(
            song.options.background(song.image.as_deref()),
        ));
        sink.apply(DisplayCommand::Chrome {
            show_header: song.options.show_header,
            show_progress_bar: song.options.show_progress_bar,
        });
        self.render(sink);

        let active = self.driver.last_active();
        sink.apply(DisplayCommand::Highlight { active });
        if active.is_some() {
            self.driver.on_resize(sink);
        } else {
            sink.apply(DisplayCommand::ResetScroll);
        }
    }

    /// Run one display frame.
    pub fn tick(&mut self, sink: &mut impl DisplaySink) {
        let duration = self.song.as_ref().map_or(0.0, |song| song.duration);
        let position = self.estimator.estimate();
        self.driver.tick(position, duration, &self.sheet, sink);
    }

    /// Parse `raw` into the current sheet, masking in game mode.
    fn parse(&mut self, raw: Option<&str>) {
        let masker = self.game_mode.then_some(&mut self.masker);
        self.sheet = LyricSheet::parse(raw, masker);

        match self.sheet.timing {
            Timing::Timed => debug!("Parsed {} timed lines", self.sheet.len()),
            Timing::Untimed => {
                info!("No timestamps found, showing {} untimed lines", self.sheet.len());
            }
            Timing::NotFound => info!("No lyrics for this song"),
        }
    }

    fn render(&self, sink: &mut impl DisplaySink) {
        sink.apply(DisplayCommand::RenderLines(Arc::from(self.sheet.lines.as_slice())));
    }

    /// Scroll to the top and forget the active line; the next frame
    /// highlights and scrolls from a clean state.
    fn reset_view(&mut self, sink: &mut impl DisplaySink) {
        self.driver.reset();
        sink.apply(DisplayCommand::ResetScroll);
        sink.apply(DisplayCommand::Highlight { active: None });
    }

    #[must_use]
    pub const fn song(&self) -> Option<&SongContext> {
        self.song.as_ref()
    }

    #[must_use]
    pub const fn sheet(&self) -> &LyricSheet {
        &self.sheet
    }

    #[must_use]
    pub const fn game_mode(&self) -> bool {
        self.game_mode
    }

    #[must_use]
    pub const fn estimator(&self) -> &PositionEstimator {
        &self.estimator
    }

    #[must_use]
    pub const fn active_line(&self) -> Option<usize> {
        self.driver.last_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::display::{Background, ScrollBehavior};
    use crate::mask::contains_marker;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    const LYRICS: &str = "[00:01.00]First line of the song\n[00:04.00]Second line of the song";

    fn session() -> (Session, ManualClock) {
        let clock = ManualClock::new();
        let session = Session::new(Arc::new(clock.clone()), 0.0)
            .with_masker(WordMasker::with_rng(StdRng::seed_from_u64(9)));
        (session, clock)
    }

    fn update(lyrics: Option<&str>, position: f64, state: &str) -> SongData {
        SongData {
            title: Some("Song".into()),
            artist: Some("Band".into()),
            album: None,
            duration: Some(100.0),
            image: Some("art.jpg".into()),
            lyrics: lyrics.map(str::to_string),
            position: Some(position),
            state: Some(state.into()),
        }
    }

    fn count(sink: &[DisplayCommand], pred: impl Fn(&DisplayCommand) -> bool) -> usize {
        sink.iter().filter(|c| pred(c)).count()
    }

    fn render_count(sink: &[DisplayCommand]) -> usize {
        count(sink, |c| matches!(c, DisplayCommand::RenderLines(_)))
    }

    #[test]
    fn test_first_update_renders_everything() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.apply_update(
            &update(Some(LYRICS), 0.0, "playing"),
            DisplayOptions::default(),
            &mut sink,
        );

        assert_eq!(
            sink[0],
            DisplayCommand::TrackText {
                title: "Song".into(),
                artist: "Band".into()
            }
        );
        assert_eq!(
            sink[1],
            DisplayCommand::Background(Background::Artwork {
                url: "art.jpg".into()
            })
        );
        assert_eq!(render_count(&sink), 1);
        assert_eq!(
            count(&sink, |c| matches!(c, DisplayCommand::ResetScroll)),
            1
        );
        assert_eq!(session.sheet().len(), 2);
        assert!(session.estimator().is_playing());
    }

    #[test]
    fn test_missing_lyrics_render_placeholder() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.apply_update(
            &update(None, 0.0, "paused"),
            DisplayOptions::default(),
            &mut sink,
        );

        let lines = sink
            .iter()
            .find_map(|c| match c {
                DisplayCommand::RenderLines(lines) => Some(Arc::clone(lines)),
                _ => None,
            })
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Lyrics not found");
    }

    #[test]
    fn test_same_lyrics_do_not_reparse() {
        let (mut session, clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.apply_update(
            &update(Some(LYRICS), 0.0, "playing"),
            DisplayOptions::default(),
            &mut sink,
        );
        let parsed = session.sheet().clone();

        clock.advance(Duration::from_secs(5));
        sink.clear();
        session.apply_update(
            &update(Some(LYRICS), 5.0, "playing"),
            DisplayOptions::default(),
            &mut sink,
        );

        assert_eq!(render_count(&sink), 0);
        assert_eq!(session.sheet(), &parsed);
    }

    #[test]
    fn test_new_song_with_same_lyrics_resets_view() {
        let (mut session, clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.apply_update(
            &update(Some(LYRICS), 10.0, "playing"),
            DisplayOptions::default(),
            &mut sink,
        );
        session.tick(&mut sink);
        assert_eq!(session.active_line(), Some(1));

        let mut next = update(Some(LYRICS), 0.0, "playing");
        next.title = Some("Other Song".into());
        sink.clear();
        session.apply_update(&next, DisplayOptions::default(), &mut sink);

        assert_eq!(render_count(&sink), 0);
        assert_eq!(
            count(&sink, |c| matches!(c, DisplayCommand::ResetScroll)),
            1
        );
        assert!(sink.contains(&DisplayCommand::Highlight { active: None }));
        assert_eq!(session.active_line(), None);

        clock.advance(Duration::from_secs(2));
        sink.clear();
        session.tick(&mut sink);
        assert_eq!(session.active_line(), Some(0));
        assert!(sink.contains(&DisplayCommand::ScrollToLine {
            index: 0,
            behavior: ScrollBehavior::Smooth
        }));
    }

    #[test]
    fn test_new_lyrics_reset_highlight() {
        let (mut session, clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.apply_update(
            &update(Some(LYRICS), 10.0, "playing"),
            DisplayOptions::default(),
            &mut sink,
        );
        session.tick(&mut sink);
        assert_eq!(session.active_line(), Some(1));

        sink.clear();
        session.apply_update(
            &update(Some("[00:02.00]Another song"), 0.0, "playing"),
            DisplayOptions::default(),
            &mut sink,
        );
        assert_eq!(render_count(&sink), 1);
        assert_eq!(session.active_line(), None);

        clock.advance(Duration::from_secs(3));
        session.tick(&mut sink);
        assert_eq!(session.active_line(), Some(0));
    }

    #[test]
    fn test_game_mode_masks_and_unmasks() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.apply_update(
            &update(Some(LYRICS), 0.0, "paused"),
            DisplayOptions::default(),
            &mut sink,
        );
        assert!(session.sheet().lines.iter().all(|l| !l.is_masked));

        sink.clear();
        session.toggle_game_mode(true, &mut sink);
        assert!(session.game_mode());
        assert_eq!(render_count(&sink), 1);
        assert!(session
            .sheet()
            .lines
            .iter()
            .all(|l| l.is_masked == contains_marker(&l.text)));

        sink.clear();
        session.toggle_game_mode(true, &mut sink);
        assert!(sink.is_empty(), "already enabled");

        session.toggle_game_mode(false, &mut sink);
        assert_eq!(session.sheet().lines[0].text, "First line of the song");
        assert_eq!(session.sheet().lines[1].text, "Second line of the song");
    }

    #[test]
    fn test_game_mode_from_options_reparses() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();
        let data = update(Some(LYRICS), 0.0, "paused");

        session.apply_update(&data, DisplayOptions::default(), &mut sink);
        sink.clear();

        let options = DisplayOptions {
            game_mode_enabled: true,
            ..DisplayOptions::default()
        };
        session.apply_update(&data, options, &mut sink);

        assert!(session.game_mode());
        assert_eq!(render_count(&sink), 1);
        assert!(sink.contains(&DisplayCommand::GameMode { enabled: true }));
    }

    #[test]
    fn test_manual_offset_survives_song_change() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.adjust_offset(1.5);
        session.apply_update(
            &update(Some(LYRICS), 2.0, "paused"),
            DisplayOptions::default(),
            &mut sink,
        );
        session.apply_update(
            &update(Some("[00:01.00]Next"), 2.0, "paused"),
            DisplayOptions::default(),
            &mut sink,
        );

        assert!((session.estimator().estimate() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_sync_message_moves_highlight() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.apply_update(
            &update(Some(LYRICS), 0.0, "paused"),
            DisplayOptions::default(),
            &mut sink,
        );
        session.handle(
            InboundMessage::Sync {
                data: SyncData {
                    position: Some(4.5),
                    state: Some("paused".into()),
                },
            },
            &mut sink,
        );

        sink.clear();
        session.tick(&mut sink);
        assert_eq!(session.active_line(), Some(1));
        assert!(sink.contains(&DisplayCommand::ScrollToLine {
            index: 1,
            behavior: ScrollBehavior::Smooth
        }));
    }

    #[test]
    fn test_update_visibility_emits_chrome() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.apply_update(
            &update(Some(LYRICS), 0.0, "paused"),
            DisplayOptions::default(),
            &mut sink,
        );
        sink.clear();
        session.update_visibility(false, true, &mut sink);

        assert_eq!(
            sink,
            vec![DisplayCommand::Chrome {
                show_header: false,
                show_progress_bar: true
            }]
        );
        let options = &session.song().unwrap().options;
        assert!(!options.show_header);
        assert!(options.show_progress_bar);
    }

    #[test]
    fn test_tick_before_any_update_is_silent() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.tick(&mut sink);
        assert!(sink.is_empty());
        assert_eq!(session.active_line(), None);
    }

    #[test]
    fn test_viewport_resize_recenters_instantly() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.viewport_resized(&mut sink);
        assert!(sink.is_empty(), "nothing active yet");

        session.apply_update(
            &update(Some(LYRICS), 4.5, "paused"),
            DisplayOptions::default(),
            &mut sink,
        );
        session.tick(&mut sink);
        sink.clear();

        session.viewport_resized(&mut sink);
        assert_eq!(
            sink,
            vec![DisplayCommand::ScrollToLine {
                index: 1,
                behavior: ScrollBehavior::Instant
            }]
        );
    }

    #[test]
    fn test_resync_before_any_update_only_reports_game_mode() {
        let (session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.resync(&mut sink);
        assert_eq!(sink, vec![DisplayCommand::GameMode { enabled: false }]);
    }

    #[test]
    fn test_resync_replays_current_state() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();

        session.apply_update(
            &update(Some(LYRICS), 4.5, "paused"),
            DisplayOptions::default(),
            &mut sink,
        );
        session.tick(&mut sink);
        sink.clear();

        session.resync(&mut sink);

        assert!(sink.contains(&DisplayCommand::TrackText {
            title: "Song".into(),
            artist: "Band".into()
        }));
        assert!(sink.contains(&DisplayCommand::Background(Background::Artwork {
            url: "art.jpg".into()
        })));
        assert_eq!(render_count(&sink), 1);
        assert!(sink.contains(&DisplayCommand::Highlight { active: Some(1) }));
        assert_eq!(
            sink.last(),
            Some(&DisplayCommand::ScrollToLine {
                index: 1,
                behavior: ScrollBehavior::Instant
            })
        );
        assert_eq!(session.active_line(), Some(1), "resync leaves state alone");
    }

    #[test]
    fn test_id_tags_fill_missing_track_fields() {
        let (mut session, _clock) = session();
        let mut sink: Vec<DisplayCommand> = Vec::new();
        let data = SongData {
            lyrics: Some("[ti:Tagged Title]\n[ar:Tagged Artist]\n[length:2:00]\n[00:01.00]Hi".into()),
            artist: Some("Server Artist".into()),
            ..SongData::default()
        };

        session.apply_update(&data, DisplayOptions::default(), &mut sink);

        assert_eq!(
            sink[0],
            DisplayCommand::TrackText {
                title: "Tagged Title".into(),
                artist: "Server Artist".into()
            }
        );
        let song = session.song().unwrap();
        assert!((song.duration - 120.0).abs() < 1e-9);
    }
}
