use tracing::debug;

use crate::corpus::{Corpus, MAX_CHAPTER};
use crate::normalize::normalize;
use crate::similarity::similarity;
use crate::srt::TimedSegment;

/// Guesses the chapter being recited from the best single segment/verse score.
///
/// Scans every verse of chapters `1..=min(114, chapter_count)` against every
/// segment. Returns `None` unless the best score is above `threshold`; ties
/// keep the lower chapter.
pub fn detect_chapter(segments: &[TimedSegment], corpus: &Corpus, threshold: f64) -> Option<u32> {
    let last = MAX_CHAPTER.min(corpus.chapter_count() as u32);
    let seg_texts: Vec<String> = segments.iter().map(|s| normalize(&s.text)).collect();

    let mut best: Option<(u32, f64)> = None;
    for chapter in corpus.chapters().iter().filter(|c| c.id >= 1 && c.id <= last) {
        for verse in corpus.verses(chapter.id) {
            for seg_text in &seg_texts {
                let score = similarity(seg_text, &verse.normalized);
                if score > threshold && best.is_none_or(|(_, b)| score > b) {
                    best = Some((chapter.id, score));
                }
            }
        }
    }

    match best {
        Some((chapter, score)) => {
            debug!(chapter, score, "chapter detected");
            Some(chapter)
        }
        None => {
            debug!("no chapter scored above the detection threshold");
            None
        }
    }
}
