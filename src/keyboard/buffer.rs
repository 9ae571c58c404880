//! Typed text and the key-action state machine.
//!
//! Every transition returns the keystrokes that reproduce it in the focused
//! application, in the order they must be sent.

use super::layout::KeyCap;

/// One replayable injection operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    Text(String),
    Space,
    Backspace,
}

#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    suggestion: Option<String>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn set_suggestion(&mut self, suggestion: Option<String>) {
        self.suggestion = suggestion;
    }

    pub fn apply(&mut self, key: KeyCap) -> Vec<Keystroke> {
        match key {
            KeyCap::Char(c) => {
                let lower: String = c.to_lowercase().collect();
                self.text.push_str(&lower);
                vec![Keystroke::Text(lower)]
            }
            KeyCap::Space => {
                self.text.push(' ');
                self.suggestion = None;
                vec![Keystroke::Space]
            }
            KeyCap::Backspace => match self.text.pop() {
                Some(_) => vec![Keystroke::Backspace],
                None => Vec::new(),
            },
            KeyCap::Complete => self.complete(),
        }
    }

    fn complete(&mut self) -> Vec<Keystroke> {
        let Some(suggestion) = self.suggestion.take() else {
            return Vec::new();
        };

        let mut tokens: Vec<&str> = self.text.split_whitespace().collect();
        let erase = tokens.pop().map_or(0, |last| last.chars().count());
        let mut keys = vec![Keystroke::Backspace; erase];
        keys.push(Keystroke::Text(suggestion.clone()));

        tokens.push(&suggestion);
        self.text = tokens.join(" ");

        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str, suggestion: Option<&str>) -> TextBuffer {
        TextBuffer {
            text: text.into(),
            suggestion: suggestion.map(String::from),
        }
    }

    #[test]
    fn test_char_is_lowercased() {
        let mut b = TextBuffer::new();
        assert_eq!(b.apply(KeyCap::Char('H')), vec![Keystroke::Text("h".into())]);
        assert_eq!(b.apply(KeyCap::Char('1')), vec![Keystroke::Text("1".into())]);
        assert_eq!(b.text(), "h1");
    }

    #[test]
    fn test_space_clears_suggestion() {
        let mut b = buffer("hola", Some("holanda"));
        assert_eq!(b.apply(KeyCap::Space), vec![Keystroke::Space]);
        assert_eq!(b.text(), "hola ");
        assert_eq!(b.suggestion(), None);
    }

    #[test]
    fn test_backspace() {
        let mut b = buffer("añ", None);
        assert_eq!(b.apply(KeyCap::Backspace), vec![Keystroke::Backspace]);
        assert_eq!(b.text(), "a");
        b.apply(KeyCap::Backspace);
        assert_eq!(b.apply(KeyCap::Backspace), vec![]);
        assert_eq!(b.text(), "");
    }

    #[test]
    fn test_complete_replaces_fragment() {
        let mut b = buffer("hola qu", Some("que"));
        let keys = b.apply(KeyCap::Complete);
        assert_eq!(
            keys,
            vec![
                Keystroke::Backspace,
                Keystroke::Backspace,
                Keystroke::Text("que".into())
            ]
        );
        assert_eq!(b.text(), "hola que");
        assert_eq!(b.suggestion(), None);
    }

    #[test]
    fn test_complete_counts_chars_not_bytes() {
        let mut b = buffer("niñ", Some("niño"));
        let keys = b.apply(KeyCap::Complete);
        assert_eq!(keys.len(), 4);
        assert_eq!(b.text(), "niño");
    }

    #[test]
    fn test_complete_without_suggestion_is_noop() {
        let mut b = buffer("hola", None);
        assert_eq!(b.apply(KeyCap::Complete), vec![]);
        assert_eq!(b.text(), "hola");
    }

    #[test]
    fn test_complete_replaces_last_word_after_trailing_space() {
        let mut b = buffer("hola b", Some("bien"));
        assert_eq!(b.apply(KeyCap::Backspace), vec![Keystroke::Backspace]);
        assert_eq!(b.text(), "hola ");
        assert_eq!(b.suggestion(), Some("bien"));

        let keys = b.apply(KeyCap::Complete);
        let mut expected = vec![Keystroke::Backspace; 4];
        expected.push(Keystroke::Text("bien".into()));
        assert_eq!(keys, expected);
        assert_eq!(b.text(), "bien");
        assert_eq!(b.suggestion(), None);
    }

    #[test]
    fn test_complete_on_blank_buffer_only_inserts() {
        let mut b = buffer("   ", Some("hola"));
        assert_eq!(b.apply(KeyCap::Complete), vec![Keystroke::Text("hola".into())]);
        assert_eq!(b.text(), "hola");
    }

    #[test]
    fn test_complete_collapses_whitespace() {
        let mut b = buffer("uno   dos tr", Some("tres"));
        b.apply(KeyCap::Complete);
        assert_eq!(b.text(), "uno dos tres");
    }
}
