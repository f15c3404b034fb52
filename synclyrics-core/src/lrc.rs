use crate::mask::WordMasker;

/// Time value of lines parsed without any timestamp
pub const UNTIMED: f64 = -1.0;

/// Text of the placeholder line shown when no lyrics are available
pub const NOT_FOUND_TEXT: &str = "Lyrics not found";

/// Lines longer than this many characters are eligible for game-mode masking
const MASK_MIN_LINE_CHARS: usize = 10;

/// A single lyric line
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Start time in seconds, or [`UNTIMED`]
    pub time: f64,
    pub text: String,
    /// Whether `text` carries at least one mask marker
    pub is_masked: bool,
}

impl LyricLine {
    fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
            is_masked: false,
        }
    }

    #[must_use]
    pub fn is_untimed(&self) -> bool {
        self.time < 0.0
    }
}

/// How the lines of a sheet were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// At least one `[mm:ss.cc]` tag was found
    Timed,
    /// No tags; every non-blank line kept in order with [`UNTIMED`]
    Untimed,
    /// Input was empty; a single placeholder line
    NotFound,
}

/// LRC metadata from ID tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LrcMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Declared length in seconds
    pub length: Option<f64>,
    pub offset: i64, // milliseconds, can be negative
}

/// Parsed lyrics ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct LyricSheet {
    pub metadata: LrcMetadata,
    pub lines: Vec<LyricLine>,
    pub timing: Timing,
}

impl LyricSheet {
    /// The single-line placeholder sheet.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            metadata: LrcMetadata::default(),
            lines: vec![LyricLine::new(0.0, NOT_FOUND_TEXT)],
            timing: Timing::NotFound,
        }
    }

    /// Parse raw lyric text.
    ///
    /// When `masker` is given (game mode), lines longer than ten characters
    /// are passed through it. Never fails: empty input yields
    /// [`LyricSheet::not_found`] and untagged input falls back to untimed lines.
    pub fn parse(raw: Option<&str>, mut masker: Option<&mut WordMasker>) -> Self {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Self::not_found();
        };

        let mut metadata = LrcMetadata::default();
        let mut timed = Vec::new();
        let mut untimed = Vec::new();

        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some((tag, value)) = parse_id_tag(line) {
                match tag.to_lowercase().as_str() {
                    "ti" => metadata.title = Some(value),
                    "ar" => metadata.artist = Some(value),
                    "length" => metadata.length = parse_length_tag(&value),
                    "offset" => {
                        if let Ok(offset) = value.parse::<i64>() {
                            metadata.offset = offset;
                        }
                    }
                    _ => {} // al, au, by, re, ve: recognized, not used
                }
                continue;
            }

            match parse_lyric_line(line) {
                Some((times, text)) => {
                    timed.extend(times.into_iter().map(|time| LyricLine::new(time, text)));
                }
                None => untimed.push(LyricLine::new(UNTIMED, line)),
            }
        }

        let (mut lines, timing) = if timed.is_empty() {
            (untimed, Timing::Untimed)
        } else {
            if metadata.offset != 0 {
                for line in &mut timed {
                    line.time = apply_offset(line.time, metadata.offset);
                }
            }
            // The active-line scan breaks on the first later line
            timed.sort_by(|a, b| a.time.total_cmp(&b.time));
            (timed, Timing::Timed)
        };

        if lines.is_empty() {
            return Self::not_found();
        }

        if let Some(masker) = masker.as_deref_mut() {
            for line in &mut lines {
                if line.text.chars().count() > MASK_MIN_LINE_CHARS {
                    let masked = masker.mask(&line.text);
                    line.is_masked = masked.is_masked();
                    line.text = masked.text;
                }
            }
        }

        Self {
            metadata,
            lines,
            timing,
        }
    }

    /// Index of the line that should be highlighted at `position` seconds.
    ///
    /// Returns the highest timed line whose start is at or before `position`.
    /// Untimed lines are never active.
    #[must_use]
    pub fn active_index(&self, position: f64) -> Option<usize> {
        let mut active = None;
        for (index, line) in self.lines.iter().enumerate() {
            if line.is_untimed() {
                continue;
            }
            if position >= line.time {
                active = Some(index);
            } else {
                break;
            }
        }
        active
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for LyricSheet {
    fn default() -> Self {
        Self::not_found()
    }
}

/// Parse an ID tag line like `[ti:Title]` or `[offset:+250]`.
///
/// Tag names are ASCII letters only, so bracketed section labels such as
/// `[Verse 1: Artist]` stay lyric text.
fn parse_id_tag(line: &str) -> Option<(String, String)> {
    let content = line.strip_prefix('[')?.strip_suffix(']')?;
    let (tag, value) = content.split_once(':')?;

    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    Some((tag.to_string(), value.trim().to_string()))
}

/// Parse a length tag value like "3:45" or "03:45.20" into seconds
fn parse_length_tag(s: &str) -> Option<f64> {
    let (minutes, seconds) = s.split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;

    Some(f64::from(minutes) * 60.0 + seconds)
}

/// Find the first timestamp tag on a line.
///
/// Returns every tag stacked directly after it (`[00:05.00][00:15.00]Chorus`)
/// and the trimmed text that follows.
fn parse_lyric_line(line: &str) -> Option<(Vec<f64>, &str)> {
    let (start, first) = line
        .match_indices('[')
        .find_map(|(i, _)| parse_timestamp_tag(&line[i..]).map(|tag| (i, tag)))?;

    let mut times = vec![first.0];
    let mut remaining = &line[start + first.1..];

    while let Some((time, len)) = parse_timestamp_tag(remaining) {
        times.push(time);
        remaining = &remaining[len..];
    }

    Some((times, remaining.trim()))
}

/// Parse a `[mm:ss.cc]` tag at the start of `s`.
///
/// Minutes may have any number of digits, seconds exactly two, the fraction
/// two or three. Returns the time in seconds and the byte length of the tag.
fn parse_timestamp_tag(s: &str) -> Option<(f64, usize)> {
    let content = s.strip_prefix('[')?;
    let end = content.find(']')?;
    let content = &content[..end];

    let (minutes, rest) = content.split_once(':')?;
    let (seconds, fraction) = rest.split_once('.')?;

    if minutes.is_empty() || !all_digits(minutes) {
        return None;
    }
    if seconds.len() != 2 || !all_digits(seconds) {
        return None;
    }
    if !(2..=3).contains(&fraction.len()) || !all_digits(fraction) {
        return None;
    }

    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    let fraction_value: u32 = fraction.parse().ok()?;
    let scale = if fraction.len() == 2 { 100.0 } else { 1000.0 };

    let time = f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(fraction_value) / scale;
    // '[' + content + ']'
    Some((time, end + 2))
}

fn all_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// Apply a millisecond offset to a line time, never going below zero
#[allow(clippy::cast_precision_loss)]
fn apply_offset(time: f64, offset_ms: i64) -> f64 {
    (time + offset_ms as f64 / 1000.0).max(0.0)
}
