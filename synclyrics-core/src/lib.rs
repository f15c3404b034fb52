pub mod clock;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod driver;
pub mod error;
pub mod lrc;
pub mod mask;
pub mod message;
pub mod paths;
pub mod playback;
pub mod source;
pub mod sync;

pub use clock::{Clock, ManualClock, TokioClock};
pub use config::{
    build_config_template, AnimationConfig, LoggingConfig, SyncConfig, SyncLyricsConfig,
    TransportsConfig, UiConfig, MAX_FRAME_RATE,
};
pub use coordinator::{Session, SongContext};
pub use display::{
    Background, CinemaGeometry, DisplayCommand, DisplaySink, LineState, ScrollBehavior,
};
pub use driver::HighlightDriver;
pub use error::CoreError;
pub use lrc::{LrcMetadata, LyricLine, LyricSheet, Timing, NOT_FOUND_TEXT, UNTIMED};
pub use mask::{segments, MaskedText, Segment, WordMasker, MASK_CLOSE, MASK_OPEN};
pub use message::{DisplayOptions, InboundMessage, SongData, SyncData};
pub use paths::{
    config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME,
};
pub use playback::{OffsetState, PlaybackSnapshot, PositionEstimator, SyncKind};
pub use source::MessageSource;
pub use sync::{EngineHandle, EngineInput, SyncEngine};

// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
