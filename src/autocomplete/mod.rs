//! Suggestion strategies for the text being typed
//!
//! Two engines share one [`Suggester`] seam: a sorted-vocabulary prefix
//! matcher and the char model's single-character lookahead.

pub mod vocabulary;

pub use vocabulary::Vocabulary;

/// Anything that can propose a completion for the current text.
pub trait Suggester {
    /// A suggestion that starts with, and differs from, the trailing word
    /// fragment of `text`; `None` when there is nothing to offer.
    fn suggest(&self, text: &str) -> Option<String>;
}

/// The unfinished word at the end of `text` (empty if `text` ends in whitespace).
pub fn trailing_fragment(text: &str) -> &str {
    match text.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
        Some((i, c)) => &text[i + c.len_utf8()..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_fragment() {
        assert_eq!(trailing_fragment("hola qu"), "qu");
        assert_eq!(trailing_fragment("hola"), "hola");
        assert_eq!(trailing_fragment("hola "), "");
        assert_eq!(trailing_fragment(""), "");
        assert_eq!(trailing_fragment("uno\tdos"), "dos");
        assert_eq!(trailing_fragment("año niñ"), "niñ");
    }
}
