//! Word list built from a free-text corpus, queried by prefix.

use super::{Suggester, trailing_fragment};
use crate::config::VocabularyConfig;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

/// Letter runs of the Spanish alphabet, accents included.
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-ZáéíóúüñÁÉÍÓÚÜÑ]+\b").expect("word pattern is valid"));

/// Distinct lowercase words, sorted ascending.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
}

impl Vocabulary {
    /// Load from a corpus file. A missing file gives an empty vocabulary.
    pub fn load(path: &Path, config: &VocabularyConfig) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let vocab = Self::from_text(&text, config);
                tracing::info!("Vocabulary: {} words from {}", vocab.len(), path.display());
                Ok(vocab)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("{} not found, using an empty vocabulary", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn from_text(text: &str, config: &VocabularyConfig) -> Self {
        Self::from_lines(text.lines(), config)
    }

    pub fn from_lines<'a, I>(lines: I, config: &VocabularyConfig) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let range = config.min_len..=config.max_len;
        let mut set = BTreeSet::new();
        for line in lines {
            let line = line.to_lowercase();
            for m in WORD.find_iter(&line) {
                if range.contains(&m.as_str().chars().count()) {
                    set.insert(m.as_str().to_string());
                }
            }
        }
        Self {
            words: set.into_iter().collect(),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// First word (in sorted order) that extends `prefix`.
    pub fn complete(&self, prefix: &str) -> Option<&str> {
        if prefix.is_empty() {
            return None;
        }
        let start = self.words.partition_point(|w| w.as_str() < prefix);
        self.words[start..]
            .iter()
            .take_while(|w| w.starts_with(prefix))
            .find(|w| w.as_str() != prefix)
            .map(String::as_str)
    }
}

impl Suggester for Vocabulary {
    fn suggest(&self, text: &str) -> Option<String> {
        let fragment = trailing_fragment(text).to_lowercase();
        self.complete(&fragment).map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VocabularyConfig {
        VocabularyConfig::default()
    }

    #[test]
    fn test_build_dedups_and_sorts() {
        let vocab = Vocabulary::from_text(
            "Quiero esperar.\nLa ESPERANZA, la esperanza y el niño\n",
            &config(),
        );
        assert_eq!(
            vocab.words(),
            &["esperanza", "esperar", "niño", "quiero"]
        );
    }

    #[test]
    fn test_length_filter() {
        let config = VocabularyConfig {
            min_len: 3,
            max_len: 5,
        };
        let vocab = Vocabulary::from_text("a de sol cinco palabra", &config);
        assert_eq!(vocab.words(), &["cinco", "sol"]);
    }

    #[test]
    fn test_letter_runs_need_word_boundaries() {
        let vocab = Vocabulary::from_text("casa2 perro_gato árbol", &config());
        assert_eq!(vocab.words(), &["árbol"]);
    }

    #[test]
    fn test_first_sorted_match_wins() {
        let vocab = Vocabulary::from_text("esperar esperanza", &config());
        assert_eq!(vocab.suggest("quiero esper").as_deref(), Some("esperanza"));
    }

    #[test]
    fn test_exact_word_is_not_suggested() {
        let vocab = Vocabulary::from_text("sol solar", &config());
        assert_eq!(vocab.suggest("sol").as_deref(), Some("solar"));
        assert_eq!(vocab.suggest("solar"), None);
    }

    #[test]
    fn test_no_suggestion_for_empty_or_trailing_space() {
        let vocab = Vocabulary::from_text("hola holanda", &config());
        assert_eq!(vocab.suggest(""), None);
        assert_eq!(vocab.suggest("hola "), None);
        assert_eq!(vocab.suggest("   "), None);
    }

    #[test]
    fn test_no_match() {
        let vocab = Vocabulary::from_text("hola", &config());
        assert_eq!(vocab.suggest("xyz"), None);
    }

    #[test]
    fn test_query_is_case_folded() {
        let vocab = Vocabulary::from_text("canción", &config());
        assert_eq!(vocab.suggest("CAN").as_deref(), Some("canción"));
    }

    #[test]
    fn test_missing_corpus_is_empty() {
        let vocab = Vocabulary::load(Path::new("no/such/corpus.txt"), &config()).unwrap();
        assert!(vocab.is_empty());
        assert_eq!(vocab.suggest("hola"), None);
    }
}
