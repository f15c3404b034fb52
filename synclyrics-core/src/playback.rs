use crate::clock::Clock;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Position jumps larger than this (against the running estimate) count as seeks
const SEEK_THRESHOLD: Duration = Duration::from_secs(2);

/// Last authoritative playback state received from the server
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    /// Position in seconds
    pub position: f64,
    pub is_playing: bool,
    /// When the snapshot was received, by the estimator's clock
    pub received_at: Instant,
}

/// Offsets added on top of the extrapolated position, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OffsetState {
    /// User adjustable, survives song changes
    pub manual: f64,
    /// Fixed latency compensation
    pub auto: f64,
}

impl OffsetState {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.manual + self.auto
    }
}

/// How a new snapshot relates to the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// Playback went from paused to playing
    Resumed,
    /// Playback went from playing to paused
    Paused,
    /// Position jumped away from the running estimate
    Seek,
    /// Routine correction
    Drift,
}

/// Extrapolates playback position between server syncs.
pub struct PositionEstimator {
    clock: Arc<dyn Clock>,
    snapshot: PlaybackSnapshot,
    offsets: OffsetState,
}

impl PositionEstimator {
    /// Create an estimator at position 0, paused.
    pub fn new(clock: Arc<dyn Clock>, auto_offset: f64) -> Self {
        let snapshot = PlaybackSnapshot {
            position: 0.0,
            is_playing: false,
            received_at: clock.now(),
        };
        Self {
            clock,
            snapshot,
            offsets: OffsetState {
                manual: 0.0,
                auto: auto_offset,
            },
        }
    }

    /// Replace the snapshot with fresh ground truth.
    ///
    /// Elapsed time restarts from now; nothing is carried over from the
    /// previous snapshot.
    pub fn sync(&mut self, position: f64, is_playing: bool) -> SyncKind {
        let previous = self.snapshot;
        let expected = self.extrapolated();

        self.snapshot = PlaybackSnapshot {
            position,
            is_playing,
            received_at: self.clock.now(),
        };

        match (previous.is_playing, is_playing) {
            (false, true) => SyncKind::Resumed,
            (true, false) => SyncKind::Paused,
            _ if (position - expected).abs() > SEEK_THRESHOLD.as_secs_f64() => SyncKind::Seek,
            _ => SyncKind::Drift,
        }
    }

    /// Nudge the manual offset by `delta` seconds and return the new value.
    pub fn adjust_offset(&mut self, delta: f64) -> f64 {
        self.offsets.manual += delta;
        self.offsets.manual
    }

    /// Current estimated position in seconds, offsets included. Not clamped.
    #[must_use]
    pub fn estimate(&self) -> f64 {
        self.extrapolated() + self.offsets.total()
    }

    /// Snapshot position plus elapsed time while playing, without offsets
    fn extrapolated(&self) -> f64 {
        if !self.snapshot.is_playing {
            return self.snapshot.position;
        }
        let elapsed = self
            .clock
            .now()
            .saturating_duration_since(self.snapshot.received_at);
        self.snapshot.position + elapsed.as_secs_f64()
    }

    #[must_use]
    pub const fn snapshot(&self) -> &PlaybackSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn offsets(&self) -> &OffsetState {
        &self.offsets
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.snapshot.is_playing
    }
}

impl std::fmt::Debug for PositionEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionEstimator")
            .field("snapshot", &self.snapshot)
            .field("offsets", &self.offsets)
            .finish_non_exhaustive()
    }
}
