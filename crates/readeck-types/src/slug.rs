//! Unicode-aware slugification.
//!
//! Ported from Readeck's `pkg/utils/slug.go`, which decomposes to NFKD,
//! keeps letters and numbers (lower-cased, diacritics stripped), drops marks,
//! and collapses every other run of characters into a single hyphen.

use unicode_normalization::UnicodeNormalization;

/// Replaces each run of characters that are not Unicode letters or numbers
/// with a single hyphen, except for leading or trailing runes. Letters are
/// stripped of diacritical marks and lower-cased.
pub fn slug(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut dash = false;

    for r in decompose_compat(s) {
        if r.is_alphanumeric() {
            buf.extend(r.to_lowercase());
            dash = true;
        } else if is_mark_or_modifier(r) {
            // skip combining marks, modifier symbols/letters
        } else if dash {
            buf.push('-');
            dash = false;
        }
    }

    if buf.ends_with('-') {
        buf.pop();
    }
    buf
}

/// NFKD decomposition (compatibility decomposition), matching Go's
/// `golang.org/x/text/unicode/norm.NFKD`.
fn decompose_compat(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfkd()
}

/// Combining marks (categories Mn/Mc/Me), modifier symbols (Sk) and modifier
/// letters (Lm) are dropped rather than becoming a separator, mirroring the
/// `nop` RangeTable in the original.
///
/// Minimal category check sufficient for the marks `Slug` needs to drop:
/// combining diacritics produced by NFKD decomposition of Latin/other
/// letters, plus modifier letters/symbols. We don't pull in a full Unicode
/// category crate for this; the ranges below cover the marks that NFKD
/// produces for all scripts this extractor is expected to see.
fn is_mark_or_modifier(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' // Combining Diacritical Marks
        | '\u{1AB0}'..='\u{1AFF}' // Combining Diacritical Marks Extended
        | '\u{1DC0}'..='\u{1DFF}' // Combining Diacritical Marks Supplement
        | '\u{20D0}'..='\u{20FF}' // Combining Diacritical Marks for Symbols
        | '\u{FE20}'..='\u{FE2F}' // Combining Half Marks
        | '\u{02B0}'..='\u{02FF}' // Spacing Modifier Letters (Lm/Sk)
        | '\u{A700}'..='\u{A71F}' // Modifier Tone Letters
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_accented_french() {
        assert_eq!(
            slug("c'est intéressant comme ça ?"),
            "c-est-interessant-comme-ca"
        );
    }

    #[test]
    fn drops_emoji_keeps_words() {
        assert_eq!(slug("🙂 happy 🐈"), "happy");
    }

    #[test]
    fn collapses_runs_and_trims() {
        assert_eq!(slug("  Hello,   World!!  "), "hello-world");
    }

    #[test]
    fn empty_input_yields_empty_slug() {
        assert_eq!(slug(""), "");
    }

    #[test]
    fn passthrough_for_non_latin_scripts() {
        // CJK ideographs are themselves "letters" and pass through unaltered.
        assert_eq!(slug("你好 world"), "你好-world");
    }
}
