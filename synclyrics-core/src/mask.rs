//! Word masking for game mode.
//!
//! A masked word is wrapped as `⁅word⁆`. Use [`segments`] to split marked text
//! back into plain and masked runs for rendering.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Opening mask marker
pub const MASK_OPEN: char = '\u{2045}';
/// Closing mask marker
pub const MASK_CLOSE: char = '\u{2046}';

/// Words of this many characters or fewer are never masked
const MIN_MASKABLE_CHARS: usize = 2;

/// Result of masking one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedText {
    /// Line text with masked words wrapped in markers
    pub text: String,
    /// Number of random picks made
    pub attempts: usize,
    /// Number of words actually wrapped
    pub masked_words: usize,
}

impl MaskedText {
    #[must_use]
    pub const fn is_masked(&self) -> bool {
        self.masked_words > 0
    }
}

/// Randomly obscures words in lyric lines.
pub struct WordMasker {
    rng: Box<dyn RngCore + Send>,
}

impl WordMasker {
    /// Masker seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Masker drawing from a caller-supplied random source.
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// Mask `max(1, words / 3)` random picks of the words in `text`.
    ///
    /// Picks are made with replacement, so fewer words may end up masked.
    pub fn mask(&mut self, text: &str) -> MaskedText {
        let mut words: Vec<String> = text.split(' ').map(str::to_string).collect();
        let attempts = (words.len() / 3).max(1);
        let mut masked_words = 0;

        for _ in 0..attempts {
            let index = self.rng.random_range(0..words.len());
            let word = &mut words[index];
            if is_maskable(word) {
                *word = format!("{MASK_OPEN}{word}{MASK_CLOSE}");
                masked_words += 1;
            }
        }

        MaskedText {
            text: words.join(" "),
            attempts,
            masked_words,
        }
    }
}

impl Default for WordMasker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WordMasker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordMasker").finish_non_exhaustive()
    }
}

fn is_maskable(word: &str) -> bool {
    word.chars().count() > MIN_MASKABLE_CHARS && !contains_marker(word)
}

/// Whether `text` contains a mask marker.
#[must_use]
pub fn contains_marker(text: &str) -> bool {
    text.contains(MASK_OPEN) || text.contains(MASK_CLOSE)
}

/// A run of line text, either shown or hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Masked(&'a str),
}

/// Split marked text into plain and masked runs.
///
/// An unterminated opening marker is treated as plain text.
#[must_use]
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(MASK_OPEN) {
        let after_open = &rest[open + MASK_OPEN.len_utf8()..];
        let Some(close) = after_open.find(MASK_CLOSE) else {
            break;
        };
        if open > 0 {
            out.push(Segment::Plain(&rest[..open]));
        }
        out.push(Segment::Masked(&after_open[..close]));
        rest = &after_open[close + MASK_CLOSE.len_utf8()..];
    }

    if !rest.is_empty() {
        out.push(Segment::Plain(rest));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> WordMasker {
        WordMasker::with_rng(StdRng::seed_from_u64(seed))
    }

    fn masked_words(text: &str) -> Vec<&str> {
        segments(text)
            .into_iter()
            .filter_map(|s| match s {
                Segment::Masked(w) => Some(w),
                Segment::Plain(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_attempt_count_follows_word_count() {
        let mut masker = seeded(1);
        assert_eq!(masker.mask("one").attempts, 1);
        assert_eq!(masker.mask("one two").attempts, 1);
        assert_eq!(masker.mask("one two three four five six").attempts, 2);
        assert_eq!(masker.mask("a b c d e f g h i").attempts, 3);
    }

    #[test]
    fn test_structural_properties_hold_for_many_seeds() {
        let line = "we are never ever getting back together at all";
        let word_count = line.split(' ').count();

        for seed in 0..200 {
            let result = seeded(seed).mask(line);

            assert_eq!(result.text.split(' ').count(), word_count);
            assert!(result.attempts >= (word_count / 3).max(1));
            assert!(result.masked_words <= result.attempts);
            for word in masked_words(&result.text) {
                assert!(word.chars().count() >= 3, "short word masked: {word}");
            }
        }
    }

    #[test]
    fn test_short_words_never_masked() {
        for seed in 0..50 {
            let result = seeded(seed).mask("to be or no it is");
            assert_eq!(result.masked_words, 0);
            assert!(!contains_marker(&result.text));
        }
    }

    #[test]
    fn test_single_eligible_word_is_masked() {
        let result = seeded(7).mask("hello");
        assert_eq!(result.text, "⁅hello⁆");
        assert!(result.is_masked());
    }

    #[test]
    fn test_no_double_masking_within_a_pass() {
        for seed in 0..100 {
            let result = seeded(seed).mask("alpha beta gamma delta epsilon zeta");
            assert!(!result.text.contains("⁅⁅"));
            assert_eq!(
                result.masked_words,
                masked_words(&result.text).len(),
                "collisions must not wrap a word twice"
            );
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let line = "shine bright like a diamond tonight";
        assert_eq!(seeded(42).mask(line), seeded(42).mask(line));
    }

    #[test]
    fn test_marked_words_are_left_alone() {
        let result = seeded(3).mask("⁅already⁆");
        assert_eq!(result.text, "⁅already⁆");
        assert_eq!(result.masked_words, 0);
    }

    #[test]
    fn test_segments_split_runs() {
        assert_eq!(
            segments("say ⁅my⁆ name ⁅twice⁆"),
            vec![
                Segment::Plain("say "),
                Segment::Masked("my"),
                Segment::Plain(" name "),
                Segment::Masked("twice"),
            ]
        );
    }

    #[test]
    fn test_segments_plain_text() {
        assert_eq!(segments("no masks"), vec![Segment::Plain("no masks")]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_segments_unterminated_marker() {
        assert_eq!(segments("open ⁅end"), vec![Segment::Plain("open ⁅end")]);
    }
}
