//! Text normalization for comparing transcribed Arabic against the reference.
//!
//! Only vocalization marks are stripped; letter shapes (alef variants, ta
//! marbuta, ...) are compared as-is.

/// Harakat, tanwin, shadda, sukun and the extended marks up to U+065F.
const DIACRITICS: std::ops::RangeInclusive<char> = '\u{064B}'..='\u{065F}';
/// Superscript (dagger) alef.
const SUPERSCRIPT_ALEF: char = '\u{0670}';

/// Arabic-Indic digits, indexed by value.
const NATIVE_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

#[inline]
pub fn is_diacritic(c: char) -> bool {
    DIACRITICS.contains(&c) || c == SUPERSCRIPT_ALEF
}

/// Strips diacritics and collapses whitespace runs to one space, trimmed.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        let before = out.len();
        if before > 0 {
            out.push(' ');
        }
        out.extend(word.chars().filter(|c| !is_diacritic(*c)));
        // a "word" made only of marks vanishes, drop the separator we just pushed
        if out.len() == before + usize::from(before > 0) {
            out.truncate(before);
        }
    }
    out
}

/// Normalized text split into words.
pub fn normalized_words(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders `n` with Arabic-Indic digit glyphs, digit order preserved.
pub fn to_native_digits(n: u32) -> String {
    n.to_string()
        .chars()
        .map(|d| d.to_digit(10).map_or(d, |v| NATIVE_DIGITS[v as usize]))
        .collect()
}
