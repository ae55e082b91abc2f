//! String similarity scores in `[0, 1]`.

/// Word-level match threshold used when none is configured.
pub const WORD_MATCH_THRESHOLD: f64 = 0.8;

/// Normalized indel similarity: `(|a| + |b| - indel_distance) / (|a| + |b|)`,
/// counted in chars. Two empty strings are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio(&a, &b)
}

fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    // indel distance = total - 2 * lcs
    2.0 * lcs_len(a, b) as f64 / total as f64
}

/// Longest common subsequence length, one rolling row over the shorter input.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0;
    }

    let mut row = vec![0usize; short.len() + 1];
    for &lc in long {
        let mut diag = 0usize;
        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if lc == sc {
                diag + 1
            } else {
                above.max(row[j])
            };
            diag = above;
        }
    }
    row[short.len()]
}

/// Fraction of `segment_words` that find a verse word scoring above `threshold`.
///
/// Each segment word stops at its first matching verse word; verse words may
/// be matched by more than one segment word.
pub fn word_overlap<S, V>(segment_words: &[S], verse_words: &[V], threshold: f64) -> f64
where
    S: AsRef<str>,
    V: AsRef<str>,
{
    if segment_words.is_empty() {
        return 0.0;
    }

    let verse_chars: Vec<Vec<char>> = verse_words
        .iter()
        .map(|w| w.as_ref().chars().collect())
        .collect();

    let matched = segment_words
        .iter()
        .filter(|word| {
            let word: Vec<char> = word.as_ref().chars().collect();
            verse_chars.iter().any(|v| ratio(&word, v) > threshold)
        })
        .count();

    matched as f64 / segment_words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        for s in ["a", "بسم الله", "الحمد لله رب العالمين"] {
            assert!(approx(similarity(s, s), 1.0));
        }
        assert!(approx(similarity("", ""), 1.0));
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(approx(similarity("abc", "xyz"), 0.0));
        assert!(approx(similarity("abc", ""), 0.0));
    }

    #[test]
    fn matches_indel_ratio() {
        // lcs("kitten", "sitting") = 4 ("ittn"), total = 13
        assert!(approx(similarity("kitten", "sitting"), 8.0 / 13.0));
        // one deletion: lcs = 3, total = 7
        assert!(approx(similarity("abcd", "abd"), 6.0 / 7.0));
    }

    #[test]
    fn is_symmetric_and_bounded() {
        let pairs = [
            ("الرحمن الرحيم", "الرحيم"),
            ("مالك يوم الدين", "ملك يوم الدين"),
            ("a", "ab"),
        ];
        for (x, y) in pairs {
            let s = similarity(x, y);
            assert!(approx(s, similarity(y, x)));
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn counts_chars_not_bytes() {
        // two-byte Arabic letters must not inflate the length
        assert!(approx(similarity("بس", "بسم"), 4.0 / 5.0));
    }

    #[test]
    fn word_overlap_counts_segment_words() {
        let seg = ["الحمد", "لله", "xyz"];
        let verse = ["الحمد", "لله", "رب", "العالمين"];
        assert!(approx(word_overlap(&seg, &verse, WORD_MATCH_THRESHOLD), 2.0 / 3.0));
    }

    #[test]
    fn word_overlap_allows_reusing_a_verse_word() {
        let seg = ["الله", "الله"];
        let verse = ["الله"];
        assert!(approx(word_overlap(&seg, &verse, WORD_MATCH_THRESHOLD), 1.0));
    }

    #[test]
    fn word_overlap_threshold_is_strict() {
        // "abcd" vs "abc": 6/7 ≈ 0.857
        assert!(approx(word_overlap(&["abcd"], &["abc"], 0.8), 1.0));
        assert!(approx(word_overlap(&["abcd"], &["abc"], 6.0 / 7.0), 0.0));
    }

    #[test]
    fn word_overlap_empty_segment_is_zero() {
        let empty: [&str; 0] = [];
        assert!(approx(word_overlap(&empty, &["x"], 0.8), 0.0));
        assert!(approx(word_overlap(&["x"], &empty, 0.8), 0.0));
    }
}
