//! Character-level next-character model
//!
//! Trains a small embedding → LSTM → softmax classifier on word prefixes and
//! serves single-character lookahead from the persisted artifact.
//!
//! # Layout
//!
//! - [`index`]: character ↔ code maps with the padding sentinel
//! - [`dataset`]: prefix samples and the left-pad / keep-rightmost policy
//! - [`lstm`]: the network, its gradients and the Adam optimizer
//! - [`train`]: the one-shot training job
//! - [`artifact`]: the two persisted halves (weights and maps)
//! - [`predict`]: inference and the char-model suggestion strategy

pub mod artifact;
pub mod dataset;
pub mod index;
pub mod lstm;
pub mod predict;
pub mod train;

pub use artifact::{MAPS_FILE, MODEL_FILE, load_artifacts, save_artifacts};
pub use index::{CharIndex, PAD};
pub use lstm::CharModel;
pub use predict::CharPredictor;
pub use train::{TrainProgress, TrainedModel, read_corpus_words, train};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from training, persisting or loading the char model.
#[derive(Debug, Error)]
pub enum CharModelError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The corpus has no word with two or more characters.
    #[error("corpus yields no training samples")]
    EmptyCorpus,

    #[error("model weights are inconsistent: {0}")]
    Shape(String),

    #[error("character maps are inconsistent: {0}")]
    InvalidMaps(String),

    /// Model and maps were not produced by the same training run.
    #[error("model expects {model} classes but character maps describe {maps}")]
    VocabMismatch { model: usize, maps: usize },
}
