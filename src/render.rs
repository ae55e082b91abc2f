//! Final caption text with verse citations, and the per-chapter time ranges.
//!
//! Citations follow the printed mushaf numbering of al-Fatiha: the basmala
//! (1:1) carries no number, 1:2..=1:6 are cited one lower, and the closing
//! verse is cited as 6 once, on its last occurrence in the transcript.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::align::MatchOutcome;
use crate::corpus::{Corpus, VerseRef};
use crate::merge::MergedCaption;
use crate::normalize::to_native_digits;
use crate::srt::write_srt;
use crate::timecode;

const OPENING_CHAPTER: u32 = 1;
const OPENING_CLOSING_VERSE: u32 = 7;

/// Ornate parentheses around a native-digit verse number, e.g. `﴿١﴾`.
pub fn citation_mark(n: u32) -> String {
    format!("\u{FD3F}{}\u{FD3E}", to_native_digits(n))
}

/// Number cited after a matched verse, if any.
///
/// `last_occurrence` only matters for the closing verse of the opening chapter.
pub fn cited_number(r: VerseRef, last_occurrence: bool) -> Option<u32> {
    match (r.chapter, r.verse) {
        (0, _) => None,
        (OPENING_CHAPTER, 0 | 1) => None,
        (OPENING_CHAPTER, v) if v < OPENING_CLOSING_VERSE => Some(v - 1),
        (OPENING_CHAPTER, _) => last_occurrence.then_some(OPENING_CLOSING_VERSE - 1),
        (_, v) => Some(v),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedCaption {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Renders captions in order, appending citations after each matched part.
pub fn render_captions(captions: &[MergedCaption]) -> Vec<RenderedCaption> {
    let closing = VerseRef::new(OPENING_CHAPTER, OPENING_CLOSING_VERSE);
    let closing_total = captions
        .iter()
        .flat_map(|c| &c.parts)
        .filter(|p| p.reference == closing)
        .count();
    let mut closing_seen = 0usize;
    let mut warned_out_of_order = false;

    captions
        .iter()
        .map(|caption| {
            let mut pieces: Vec<String> = Vec::with_capacity(caption.parts.len());
            for part in &caption.parts {
                let r = part.reference;
                if r == closing {
                    closing_seen += 1;
                } else if r.chapter == OPENING_CHAPTER && closing_seen > 0 && !warned_out_of_order {
                    warn!(
                        verse = %r,
                        at = caption.start,
                        "opening chapter verse after its closing verse; closing citation placement may be off"
                    );
                    warned_out_of_order = true;
                }

                let last = r == closing && closing_seen == closing_total;
                match cited_number(r, last) {
                    Some(n) => pieces.push(format!("{} {}", part.display_text, citation_mark(n))),
                    None => pieces.push(part.display_text.clone()),
                }
            }
            RenderedCaption {
                start: caption.start,
                end: caption.end,
                text: pieces.join(" ").trim().to_string(),
            }
        })
        .collect()
}

/// Caption file text for rendered captions, numbered from 1.
pub fn render_srt(captions: &[RenderedCaption]) -> String {
    write_srt(captions.iter().map(|c| (c.start, c.end, c.text.as_str())))
}

/// Time span covered by one chapter's matched segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterRange {
    pub chapter: u32,
    pub name: String,
    pub start: f64,
    pub end: f64,
}

/// One range per chapter with matches, ordered by chapter id.
///
/// Unmatched outcomes and chapters outside the corpus index are skipped.
pub fn chapter_ranges(outcomes: &[MatchOutcome], corpus: &Corpus) -> Vec<ChapterRange> {
    let mut spans: BTreeMap<u32, (f64, f64)> = BTreeMap::new();
    for o in outcomes.iter().filter(|o| o.is_matched()) {
        let span = spans
            .entry(o.reference.chapter)
            .or_insert((o.segment.start, o.segment.end));
        span.0 = span.0.min(o.segment.start);
        span.1 = span.1.max(o.segment.end);
    }

    let known = corpus.chapter_count() as u32;
    spans
        .into_iter()
        .filter(|(chapter, _)| *chapter <= known)
        .filter_map(|(chapter, (start, end))| {
            let name = corpus.chapter(chapter)?.name.clone();
            Some(ChapterRange {
                chapter,
                name,
                start,
                end,
            })
        })
        .collect()
}

/// `<name>: <start> --> <end>` per line.
pub fn render_ranges(ranges: &[ChapterRange]) -> String {
    ranges
        .iter()
        .map(|r| {
            format!(
                "{}: {} --> {}\n",
                r.name,
                timecode::format(r.start),
                timecode::format(r.end)
            )
        })
        .collect()
}
