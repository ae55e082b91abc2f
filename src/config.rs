use serde::Serialize;

/// Scoring and search-window settings for one alignment run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignConfig {
    /// A candidate is accepted only when its combined score is above this.
    pub accept_threshold: f64,
    /// Chapter detection needs a whole-text score above this.
    pub detect_threshold: f64,
    /// Per-word similarity needed for a word to count as matched.
    pub word_match_threshold: f64,
    pub whole_weight: f64,
    pub word_weight: f64,
    /// Verses searched before the current pointer.
    pub window_behind: u32,
    /// Verses searched after the current pointer.
    pub window_ahead: u32,
    /// A verse already attributed more than this many times is no longer a candidate.
    pub max_repeats: u32,
}

impl AlignConfig {
    pub const DEFAULT_THRESHOLD: f64 = 0.75;
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            accept_threshold: Self::DEFAULT_THRESHOLD,
            detect_threshold: Self::DEFAULT_THRESHOLD,
            word_match_threshold: crate::similarity::WORD_MATCH_THRESHOLD,
            whole_weight: 0.7,
            word_weight: 0.3,
            window_behind: 1,
            window_ahead: 2,
            max_repeats: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeConfig {
    pub min_words: usize,
    pub max_gap_secs: f64,
}

impl MergeConfig {
    pub const DEFAULT_MIN_WORDS: usize = 5;
    pub const DEFAULT_MAX_GAP_SECS: f64 = 1.0;
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_words: Self::DEFAULT_MIN_WORDS,
            max_gap_secs: Self::DEFAULT_MAX_GAP_SECS,
        }
    }
}

/// Options for processing one caption file.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Chapters to match against. Empty means detect one from the text.
    pub chapters: Vec<u32>,
    pub merge_enabled: bool,
    pub merge: MergeConfig,
    pub align: AlignConfig,
}
