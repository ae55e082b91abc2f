use serde::Serialize;
use tracing::debug;

use crate::align::MatchOutcome;
use crate::config::MergeConfig;
use crate::corpus::VerseRef;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionPart {
    pub display_text: String,
    pub reference: VerseRef,
}

/// One output caption built from one or more consecutive outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedCaption {
    pub start: f64,
    pub end: f64,
    pub parts: Vec<CaptionPart>,
}

impl MergedCaption {
    pub fn single(outcome: &MatchOutcome) -> Self {
        Self {
            start: outcome.segment.start,
            end: outcome.segment.end,
            parts: vec![CaptionPart {
                display_text: outcome.display_text.clone(),
                reference: outcome.reference,
            }],
        }
    }

    fn absorb(&mut self, outcome: &MatchOutcome) {
        self.start = self.start.min(outcome.segment.start);
        self.end = self.end.max(outcome.segment.end);
        self.parts.push(CaptionPart {
            display_text: outcome.display_text.clone(),
            reference: outcome.reference,
        });
    }

    fn last_reference(&self) -> VerseRef {
        self.parts
            .last()
            .map(|p| p.reference)
            .unwrap_or(VerseRef::UNMATCHED)
    }
}

/// Words an outcome contributes to a caption; the unmatched marker is not counted.
pub fn word_count(outcome: &MatchOutcome) -> usize {
    let text = if outcome.is_matched() {
        &outcome.display_text
    } else {
        &outcome.segment.text
    };
    text.split_whitespace().count()
}

/// One caption per outcome, used when merging is disabled.
pub fn single_captions(outcomes: &[MatchOutcome]) -> Vec<MergedCaption> {
    outcomes.iter().map(MergedCaption::single).collect()
}

/// Greedily merges time-sorted outcomes until each caption has `min_words`.
///
/// The next outcome joins the current caption only when it starts within
/// `max_gap_secs` of the caption's end, and either the caption is still short
/// or the outcome continues the same verse as the caption's last part.
/// Unmatched outcomes never count as a continuation.
pub fn merge_captions(outcomes: &[MatchOutcome], config: &MergeConfig) -> Vec<MergedCaption> {
    let mut captions = Vec::new();
    let mut iter = outcomes.iter().peekable();

    while let Some(first) = iter.next() {
        let mut caption = MergedCaption::single(first);
        let mut words = word_count(first);

        while let Some(next) = iter.peek() {
            let gap = next.segment.start - caption.end;
            if gap > config.max_gap_secs {
                break;
            }
            let last = caption.last_reference();
            let same_verse = !last.is_unmatched() && last == next.reference;
            if words >= config.min_words && !same_verse {
                break;
            }
            caption.absorb(next);
            words += word_count(next);
            iter.next();
        }

        captions.push(caption);
    }

    debug!(
        outcomes = outcomes.len(),
        captions = captions.len(),
        min_words = config.min_words,
        "captions merged"
    );
    captions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srt::TimedSegment;

    fn outcome(start: f64, end: f64, text: &str, chapter: u32, verse: u32) -> MatchOutcome {
        let segment = TimedSegment {
            index: 0,
            start,
            end,
            text: text.to_string(),
        };
        if chapter == 0 {
            return MatchOutcome::unmatched(segment);
        }
        MatchOutcome {
            segment,
            reference: VerseRef::new(chapter, verse),
            display_text: text.to_string(),
            score: 1.0,
        }
    }

    fn config(min_words: usize) -> MergeConfig {
        MergeConfig {
            min_words,
            ..MergeConfig::default()
        }
    }

    #[test]
    fn merges_short_neighbours_until_min_words() {
        let outcomes = [
            outcome(0.0, 1.0, "a b", 1, 1),
            outcome(1.5, 2.0, "c d", 1, 2),
            outcome(2.2, 3.0, "e f", 1, 3),
            outcome(3.1, 4.0, "g", 1, 4),
        ];
        let captions = merge_captions(&outcomes, &config(5));
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].parts.len(), 3);
        assert_eq!(captions[0].start, 0.0);
        assert_eq!(captions[0].end, 3.0);
        assert_eq!(captions[1].parts.len(), 1);
        assert_eq!(captions[1].parts[0].reference, VerseRef::new(1, 4));
    }

    #[test]
    fn gap_over_one_second_splits() {
        let outcomes = [outcome(0.0, 1.0, "a", 1, 1), outcome(2.01, 3.0, "b", 1, 2)];
        let captions = merge_captions(&outcomes, &config(5));
        assert_eq!(captions.len(), 2);
    }

    #[test]
    fn gap_of_exactly_max_gap_merges() {
        let outcomes = [outcome(0.0, 1.0, "a", 1, 1), outcome(2.0, 3.0, "b", 1, 2)];
        assert_eq!(merge_captions(&outcomes, &config(5)).len(), 1);
    }

    #[test]
    fn same_verse_continuation_absorbed_past_min_words() {
        let outcomes = [
            outcome(0.0, 1.0, "a b c d e f", 2, 7),
            outcome(1.2, 2.0, "a b c d e f", 2, 7),
            outcome(2.1, 3.0, "x y", 2, 8),
        ];
        let captions = merge_captions(&outcomes, &config(5));
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].parts.len(), 2);
        assert_eq!(captions[1].parts[0].reference, VerseRef::new(2, 8));
    }

    #[test]
    fn unmatched_runs_are_not_continuations() {
        let outcomes = [
            outcome(0.0, 1.0, "a b c d e", 0, 0),
            outcome(1.1, 2.0, "f g", 0, 0),
        ];
        let captions = merge_captions(&outcomes, &config(5));
        assert_eq!(captions.len(), 2);
    }

    #[test]
    fn marker_does_not_count_as_words() {
        let o = outcome(0.0, 1.0, "a b", 0, 0);
        assert_eq!(word_count(&o), 2);
        assert_eq!(o.display_text, "a b (unmatched)");
    }

    #[test]
    fn parts_keep_order_and_duplicates() {
        let outcomes = [
            outcome(0.0, 1.0, "x", 1, 3),
            outcome(1.0, 2.0, "x", 1, 3),
            outcome(2.0, 3.0, "y", 1, 4),
        ];
        let captions = merge_captions(&outcomes, &config(10));
        assert_eq!(captions.len(), 1);
        let texts: Vec<_> = captions[0].parts.iter().map(|p| p.display_text.as_str()).collect();
        assert_eq!(texts, vec!["x", "x", "y"]);
    }

    #[test]
    fn every_caption_but_the_last_reaches_min_words_or_hits_a_gap() {
        let outcomes: Vec<_> = (0..9)
            .map(|i| outcome(i as f64, i as f64 + 0.9, "w w", 1, i + 1))
            .collect();
        let captions = merge_captions(&outcomes, &config(5));
        for c in &captions[..captions.len() - 1] {
            let words: usize = c.parts.iter().map(|p| p.display_text.split_whitespace().count()).sum();
            assert!(words >= 5);
        }
        let total: usize = captions.iter().map(|c| c.parts.len()).sum();
        assert_eq!(total, 9);
    }

    #[test]
    fn single_captions_one_per_outcome() {
        let outcomes = [outcome(0.0, 1.0, "a", 1, 1), outcome(1.0, 2.0, "b", 1, 2)];
        let captions = single_captions(&outcomes);
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[1].start, 1.0);
    }
}
