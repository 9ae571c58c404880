//! Character ↔ code mapping for the char model.
//!
//! Codes start at 1. Code 0 is the padding sentinel and never names a real
//! character.

use super::CharModelError;
use std::collections::{BTreeMap, BTreeSet};

/// Reserved code for "no character"; used for left padding and unknown input.
pub const PAD: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharIndex {
    forward: BTreeMap<char, usize>,
    backward: BTreeMap<usize, char>,
}

impl CharIndex {
    /// Build an index over every character appearing in `words`.
    ///
    /// Characters are numbered in ascending order starting at 1.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        let chars: BTreeSet<char> = words.iter().flat_map(|w| w.as_ref().chars()).collect();
        let forward: BTreeMap<char, usize> =
            chars.iter().enumerate().map(|(i, &c)| (c, i + 1)).collect();
        let backward = forward.iter().map(|(&c, &i)| (i, c)).collect();
        Self { forward, backward }
    }

    /// Rebuild from persisted maps, checking that they describe one bijection.
    pub fn from_maps(
        forward: BTreeMap<char, usize>,
        backward: BTreeMap<usize, char>,
    ) -> Result<Self, CharModelError> {
        if forward.len() != backward.len() {
            return Err(CharModelError::InvalidMaps(format!(
                "char2idx has {} entries but idx2char has {}",
                forward.len(),
                backward.len()
            )));
        }
        for (&c, &code) in &forward {
            if code > forward.len() {
                return Err(CharModelError::InvalidMaps(format!(
                    "character {:?} has code {}, codes must run from 1 to {}",
                    c,
                    code,
                    forward.len()
                )));
            }
            if code == PAD {
                return Err(CharModelError::InvalidMaps(format!(
                    "character {:?} uses the padding code",
                    c
                )));
            }
            if backward.get(&code) != Some(&c) {
                return Err(CharModelError::InvalidMaps(format!(
                    "character {:?} maps to {} but idx2char disagrees",
                    c, code
                )));
            }
        }
        Ok(Self { forward, backward })
    }

    /// Code for `c`, or `None` when it was never seen in training.
    pub fn code(&self, c: char) -> Option<usize> {
        self.forward.get(&c).copied()
    }

    /// Code for `c`, falling back to the padding sentinel for unknown characters.
    pub fn code_or_pad(&self, c: char) -> usize {
        self.code(c).unwrap_or(PAD)
    }

    /// Character for `code`; the padding sentinel and unused codes give `None`.
    pub fn char_for(&self, code: usize) -> Option<char> {
        self.backward.get(&code).copied()
    }

    /// Encode a string with [`Self::code_or_pad`].
    pub fn encode(&self, text: &str) -> Vec<usize> {
        text.chars().map(|c| self.code_or_pad(c)).collect()
    }

    /// Number of classes the model works with: every known character plus padding.
    pub fn vocab_size(&self) -> usize {
        self.forward.len() + 1
    }

    pub fn forward(&self) -> &BTreeMap<char, usize> {
        &self.forward
    }

    pub fn backward(&self) -> &BTreeMap<usize, char> {
        &self.backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_start_at_one() {
        let index = CharIndex::from_words(&["hola", "sol"]);
        assert_eq!(index.vocab_size(), 6); // a h l o s + pad
        assert_eq!(index.code('a'), Some(1));
        assert_eq!(index.code('s'), Some(5));
        assert!(index.forward().values().all(|&code| code != PAD));
        assert_eq!(index.char_for(PAD), None);
    }

    #[test]
    fn test_unknown_char_is_pad() {
        let index = CharIndex::from_words(&["ab"]);
        assert_eq!(index.code_or_pad('z'), PAD);
        assert_eq!(index.encode("azb"), vec![1, PAD, 2]);
    }

    #[test]
    fn test_accented_chars_get_codes() {
        let index = CharIndex::from_words(&["niño", "canción"]);
        assert!(index.code('ñ').is_some());
        assert!(index.code('ó').is_some());
        let code = index.code('ñ').unwrap();
        assert_eq!(index.char_for(code), Some('ñ'));
    }

    #[test]
    fn test_from_maps_rejects_inconsistent_maps() {
        let index = CharIndex::from_words(&["ab"]);
        let mut backward = index.backward().clone();
        backward.insert(1, 'x');
        let err = CharIndex::from_maps(index.forward().clone(), backward);
        assert!(matches!(err, Err(CharModelError::InvalidMaps(_))));

        let mut forward = index.forward().clone();
        forward.insert('c', PAD);
        let mut backward = index.backward().clone();
        backward.insert(PAD, 'c');
        let err = CharIndex::from_maps(forward, backward);
        assert!(matches!(err, Err(CharModelError::InvalidMaps(_))));
    }

    #[test]
    fn test_from_maps_rejects_gapped_codes() {
        let forward = BTreeMap::from([('a', 1), ('b', 5)]);
        let backward = BTreeMap::from([(1, 'a'), (5, 'b')]);
        assert!(matches!(
            CharIndex::from_maps(forward, backward),
            Err(CharModelError::InvalidMaps(_))
        ));
    }

    #[test]
    fn test_from_maps_accepts_own_maps() {
        let index = CharIndex::from_words(&["perro", "gato"]);
        let rebuilt =
            CharIndex::from_maps(index.forward().clone(), index.backward().clone()).unwrap();
        assert_eq!(rebuilt, index);
    }
}
