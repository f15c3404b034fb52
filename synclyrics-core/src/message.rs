//! Inbound wire messages.
//!
//! The server pushes JSON objects discriminated by `type`:
//!
//! ```json
//! {"type": "update", "data": {"title": "...", "lyrics": "[00:01.00]..."}, "options": {...}}
//! {"type": "sync", "data": {"position": 12.5, "state": "playing"}}
//! ```
//!
//! Every field is optional on the wire. Accessors apply the defaults: missing
//! numbers are 0 and missing strings are `"Unknown"`.

use crate::display::{Background, CinemaGeometry};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Player state string that means "playing"; anything else is not playing
pub const PLAYING_STATE: &str = "playing";

/// Placeholder for missing text fields
pub const UNKNOWN: &str = "Unknown";

/// A message received from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundMessage {
    /// Full song state, sent on song change
    Update {
        #[serde(default)]
        data: SongData,
        #[serde(default)]
        options: DisplayOptions,
    },
    /// Position and play state only
    Sync {
        #[serde(default)]
        data: SyncData,
    },
}

impl InboundMessage {
    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedMessage`](crate::CoreError::MalformedMessage)
    /// if the frame is not a known message.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Message type as sent on the wire.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Update { .. } => "update",
            Self::Sync { .. } => "sync",
        }
    }
}

/// Song metadata plus an embedded sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    /// Track length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Album art URL
    #[serde(default)]
    pub image: Option<String>,
    /// Raw LRC text
    #[serde(default)]
    pub lyrics: Option<String>,
    /// Position in seconds
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub state: Option<String>,
}

impl SongData {
    /// Title, else `fallback`, else "Unknown".
    #[must_use]
    pub fn title_or<'a>(&'a self, fallback: Option<&'a str>) -> &'a str {
        self.title.as_deref().or(fallback).unwrap_or(UNKNOWN)
    }

    /// Artist, else `fallback`, else "Unknown".
    #[must_use]
    pub fn artist_or<'a>(&'a self, fallback: Option<&'a str>) -> &'a str {
        self.artist.as_deref().or(fallback).unwrap_or(UNKNOWN)
    }

    /// Duration in seconds, else `fallback`, else 0. A reported 0 counts as
    /// unknown.
    #[must_use]
    pub fn duration_or(&self, fallback: Option<f64>) -> f64 {
        self.duration
            .filter(|d| *d > 0.0)
            .or(fallback)
            .unwrap_or_default()
    }

    /// The sync carried inside this update.
    #[must_use]
    pub fn sync(&self) -> SyncData {
        SyncData {
            position: self.position,
            state: self.state.clone(),
        }
    }
}

/// Playback position and state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncData {
    /// Position in seconds
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub state: Option<String>,
}

impl SyncData {
    #[must_use]
    pub fn position_secs(&self) -> f64 {
        self.position.unwrap_or_default()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state.as_deref() == Some(PLAYING_STATE)
    }
}

/// Display configuration pushed by the server alongside each update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default = "default_true")]
    pub show_background: bool,
    #[serde(default)]
    pub cinema_mode: bool,
    /// Percent of the viewport width
    #[serde(default = "default_cinema_extent")]
    pub cinema_screen_width: f64,
    /// Percent of the viewport height
    #[serde(default = "default_cinema_extent")]
    pub cinema_screen_height: f64,
    /// 0.0 (transparent) to 1.0 (opaque)
    #[serde(default = "default_cinema_opacity")]
    pub cinema_screen_opacity: f64,
    /// Cinema mode media; falls back to album art when absent
    #[serde(default)]
    pub background_url: Option<String>,
    #[serde(default = "default_true")]
    pub show_header: bool,
    #[serde(default = "default_true")]
    pub show_progress_bar: bool,
    #[serde(default)]
    pub game_mode_enabled: bool,
}

const fn default_true() -> bool {
    true
}

const fn default_cinema_extent() -> f64 {
    100.0
}

const fn default_cinema_opacity() -> f64 {
    1.0
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_background: true,
            cinema_mode: false,
            cinema_screen_width: default_cinema_extent(),
            cinema_screen_height: default_cinema_extent(),
            cinema_screen_opacity: default_cinema_opacity(),
            background_url: None,
            show_header: true,
            show_progress_bar: true,
            game_mode_enabled: false,
        }
    }
}

impl DisplayOptions {
    #[must_use]
    pub const fn cinema_geometry(&self) -> CinemaGeometry {
        CinemaGeometry {
            screen_width: self.cinema_screen_width,
            screen_height: self.cinema_screen_height,
            screen_opacity: self.cinema_screen_opacity,
        }
    }

    /// Pick the background layer for a song with album art `image`.
    ///
    /// Cinema media wins when cinema mode is on and a URL is set (cinema mode
    /// without its own URL falls back to the album art). Otherwise album art
    /// is shown if backgrounds are enabled.
    #[must_use]
    pub fn background(&self, image: Option<&str>) -> Background {
        let image = image.filter(|url| !url.is_empty());

        if self.cinema_mode {
            let url = self
                .background_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .or(image);
            if let Some(url) = url {
                return Background::Cinema {
                    url: url.to_string(),
                    geometry: self.cinema_geometry(),
                };
            }
        }

        match image {
            Some(url) if self.show_background => Background::Artwork {
                url: url.to_string(),
            },
            _ => Background::None,
        }
    }
}
