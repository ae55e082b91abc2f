//! Sequential windowed matching of transcript segments to reference verses.
//!
//! Segments are visited once, in start-time order. Each is scored against a
//! small window of verses around a pointer that only moves forward, so
//! recitation order is followed without searching whole chapters. A verse
//! already attributed more than `max_repeats` times drops out of the search.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::AlignConfig;
use crate::corpus::{Corpus, Verse, VerseRef};
use crate::normalize::normalize;
use crate::similarity::{similarity, word_overlap};
use crate::srt::TimedSegment;

/// Appended to the transcript text of segments that matched no verse.
pub const UNMATCHED_MARKER: &str = "(unmatched)";

/// Result of aligning one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub segment: TimedSegment,
    /// [`VerseRef::UNMATCHED`] when no candidate cleared the threshold.
    pub reference: VerseRef,
    /// Reference text (with diacritics) for matches, marked transcript text otherwise.
    pub display_text: String,
    pub score: f64,
}

impl MatchOutcome {
    pub fn unmatched(segment: TimedSegment) -> Self {
        let display_text = format!("{} {UNMATCHED_MARKER}", segment.text);
        Self {
            segment,
            reference: VerseRef::UNMATCHED,
            display_text,
            score: 0.0,
        }
    }

    pub fn is_matched(&self) -> bool {
        !self.reference.is_unmatched()
    }
}

/// How many segments each verse has been attributed to in the current run.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceTracker {
    counts: HashMap<VerseRef, u32>,
}

impl OccurrenceTracker {
    pub fn count(&self, r: VerseRef) -> u32 {
        self.counts.get(&r).copied().unwrap_or(0)
    }

    /// Records one more attribution and returns the new count.
    pub fn record(&mut self, r: VerseRef) -> u32 {
        let count = self.counts.entry(r).or_insert(0);
        *count += 1;
        *count
    }

    pub fn exceeds(&self, r: VerseRef, limit: u32) -> bool {
        self.count(r) > limit
    }
}

struct Candidate<'v> {
    verse: &'v Verse,
    score: f64,
}

/// State of one forward alignment pass.
pub struct Aligner<'a> {
    corpus: &'a Corpus,
    chapters: Vec<u32>,
    config: &'a AlignConfig,
    current_ayah: u32,
    tracker: OccurrenceTracker,
}

impl<'a> Aligner<'a> {
    /// `chapters` are searched in ascending id order, duplicates ignored.
    pub fn new(corpus: &'a Corpus, chapters: &[u32], config: &'a AlignConfig) -> Self {
        let mut chapters = chapters.to_vec();
        chapters.sort_unstable();
        chapters.dedup();
        Self {
            corpus,
            chapters,
            config,
            current_ayah: 1,
            tracker: OccurrenceTracker::default(),
        }
    }

    pub fn current_ayah(&self) -> u32 {
        self.current_ayah
    }

    /// Verse numbers searched in a chapter of `verse_count` verses.
    fn window(&self, verse_count: usize) -> std::ops::RangeInclusive<u32> {
        let lo = self.current_ayah.saturating_sub(self.config.window_behind).max(1);
        let hi = self
            .current_ayah
            .saturating_add(self.config.window_ahead)
            .min(verse_count as u32);
        lo..=hi
    }

    fn score(&self, seg_text: &str, seg_words: &[&str], verse: &Verse) -> f64 {
        let whole = similarity(seg_text, &verse.normalized);
        let word = word_overlap(seg_words, verse.words.as_slice(), self.config.word_match_threshold);
        self.config.whole_weight * whole + self.config.word_weight * word
    }

    /// Aligns the next segment and advances the pass state.
    pub fn align_segment(&mut self, segment: &TimedSegment) -> MatchOutcome {
        let seg_text = normalize(&segment.text);
        let seg_words: Vec<&str> = seg_text.split(' ').filter(|w| !w.is_empty()).collect();

        let corpus = self.corpus;
        let mut best: Option<Candidate<'a>> = None;
        for &chapter in &self.chapters {
            let verses = corpus.verses(chapter);
            for n in self.window(verses.len()) {
                let verse = &verses[n as usize - 1];
                if self.tracker.exceeds(verse.reference, self.config.max_repeats) {
                    continue;
                }
                let score = self.score(&seg_text, &seg_words, verse);
                // strict: the first candidate enumerated wins ties
                if score > self.config.accept_threshold && best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(Candidate { verse, score });
                }
            }
        }

        match best {
            Some(Candidate { verse, score }) => {
                let r = verse.reference;
                let count = self.tracker.record(r);
                self.current_ayah = self.current_ayah.max(r.verse + 1);
                debug!(index = segment.index, verse = %r, score, count, "segment matched");
                MatchOutcome {
                    segment: segment.clone(),
                    reference: r,
                    display_text: verse.text.clone(),
                    score,
                }
            }
            None => {
                debug!(index = segment.index, pointer = self.current_ayah, "segment unmatched");
                MatchOutcome::unmatched(segment.clone())
            }
        }
    }

    /// Aligns every segment in order; one outcome per segment.
    pub fn align(&mut self, segments: &[TimedSegment]) -> Vec<MatchOutcome> {
        segments.iter().map(|s| self.align_segment(s)).collect()
    }
}

/// Runs one alignment pass over time-sorted `segments`.
pub fn align_segments(
    segments: &[TimedSegment],
    corpus: &Corpus,
    chapters: &[u32],
    config: &AlignConfig,
) -> Vec<MatchOutcome> {
    let mut aligner = Aligner::new(corpus, chapters, config);
    let outcomes = aligner.align(segments);
    let matched = outcomes.iter().filter(|o| o.is_matched()).count();
    info!(
        segments = outcomes.len(),
        matched,
        unmatched = outcomes.len() - matched,
        ?chapters,
        "alignment finished"
    );
    outcomes
}
