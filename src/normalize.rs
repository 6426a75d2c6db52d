//! Arabic text normalization for comparisons

use unicode_normalization::UnicodeNormalization;

/// Harakat range removed before comparing: tanwin, fatha, damma, kasra, shadda, sukun
const HARAKAT: std::ops::RangeInclusive<char> = '\u{064B}'..='\u{0652}';

pub fn is_haraka(c: char) -> bool {
    HARAKAT.contains(&c)
}

/// Normalize Arabic text for comparison: removes harakat, then composes to NFC.
///
/// Only used to build comparison keys. Page content shown to readers is never
/// passed through here.
pub fn normalize_arabic(text: &str) -> String {
    text.chars().filter(|c| !is_haraka(*c)).nfc().collect()
}

/// Key used when comparing a query word with a page token
pub fn comparison_key(text: &str) -> String {
    normalize_arabic(&text.to_lowercase())
}
