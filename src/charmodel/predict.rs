//! Next-character inference over a persisted char model.

use super::artifact::load_artifacts;
use super::dataset::pad_sequence;
use super::index::CharIndex;
use super::lstm::{CharModel, argmax};
use super::CharModelError;
use crate::autocomplete::{Suggester, trailing_fragment};
use ndarray::Array2;
use std::path::Path;

/// A loaded model plus the maps and sequence length it was trained with.
pub struct CharPredictor {
    model: CharModel,
    index: CharIndex,
    maxlen: usize,
}

impl CharPredictor {
    /// Load both artifact halves from `dir`.
    pub fn load(dir: &Path) -> Result<Self, CharModelError> {
        let (model, index, maxlen) = load_artifacts(dir)?;
        tracing::info!("Char model ready ({} classes)", index.vocab_size());
        Ok(Self::from_parts(model, index, maxlen))
    }

    pub fn from_parts(model: CharModel, index: CharIndex, maxlen: usize) -> Self {
        Self {
            model,
            index,
            maxlen,
        }
    }

    pub fn maxlen(&self) -> usize {
        self.maxlen
    }

    pub fn index(&self) -> &CharIndex {
        &self.index
    }

    /// The padded code row fed to the network for `text`.
    pub fn encode_input(&self, text: &str) -> Vec<usize> {
        let codes = self.index.encode(&text.to_lowercase());
        pad_sequence(&codes, self.maxlen)
    }

    /// Most likely character to follow `text`, or `None` when the winning
    /// class maps to no character.
    pub fn predict_next_char(&self, text: &str) -> Option<char> {
        let row = self.encode_input(text);
        let inputs = Array2::from_shape_fn((1, self.maxlen), |(_, j)| row[j]);
        let probs = self.model.predict_proba(&inputs);
        let best = argmax(probs.row(0).iter().copied());
        tracing::trace!("next char for {:?}: class {}", text, best);
        self.index.char_for(best)
    }
}

impl Suggester for CharPredictor {
    fn suggest(&self, text: &str) -> Option<String> {
        let fragment = trailing_fragment(text);
        if fragment.is_empty() {
            return None;
        }
        match self.predict_next_char(text) {
            Some(c) if !c.is_whitespace() => Some(format!("{}{}", fragment.to_lowercase(), c)),
            _ => None,
        }
    }
}
