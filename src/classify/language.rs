//! Script-based language detection.

use crate::record::Language;

const THAI_BLOCK: std::ops::RangeInclusive<char> = '\u{0E00}'..='\u{0E7F}';

/// Classifies text by the scripts it contains.
///
/// Any Thai code point wins, even in mixed text. Otherwise any ASCII Latin
/// letter means English. Everything else (digits, emoji, empty) is unknown.
///
/// # Example
///
/// ```rust
/// use chatnorm::classify::detect_language;
/// use chatnorm::record::Language;
///
/// assert_eq!(detect_language("สวัสดี hello"), Language::Thai);
/// assert_eq!(detect_language("hello"), Language::Eng);
/// assert_eq!(detect_language("12345 🎉"), Language::Unknown);
/// ```
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(|c| THAI_BLOCK.contains(&c)) {
        Language::Thai
    } else if text.chars().any(|c| c.is_ascii_alphabetic()) {
        Language::Eng
    } else {
        Language::Unknown
    }
}
