//! On-disk format for a trained char model.
//!
//! Two files live in the artifact directory: the network weights and the
//! `(char2idx, idx2char, maxlen)` triple. They are written and read together.

use super::index::CharIndex;
use super::lstm::CharModel;
use super::CharModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub const MODEL_FILE: &str = "autocomplete_lstm.json";
pub const MAPS_FILE: &str = "char_maps.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharMaps {
    pub char2idx: BTreeMap<char, usize>,
    pub idx2char: BTreeMap<usize, char>,
    pub maxlen: usize,
}

impl CharMaps {
    pub fn new(index: &CharIndex, maxlen: usize) -> Self {
        Self {
            char2idx: index.forward().clone(),
            idx2char: index.backward().clone(),
            maxlen,
        }
    }
}

/// Write weights and maps into `dir`, creating it if needed.
pub fn save_artifacts(
    dir: &Path,
    model: &CharModel,
    index: &CharIndex,
    maxlen: usize,
) -> Result<(), CharModelError> {
    fs::create_dir_all(dir).map_err(|source| CharModelError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    write_json(&dir.join(MODEL_FILE), model)?;
    write_json(&dir.join(MAPS_FILE), &CharMaps::new(index, maxlen))?;
    tracing::info!("Saved char model to {}", dir.display());
    Ok(())
}

/// Read both halves from `dir` and check that they belong together.
pub fn load_artifacts(dir: &Path) -> Result<(CharModel, CharIndex, usize), CharModelError> {
    let model: CharModel = read_json(&dir.join(MODEL_FILE))?;
    let maps: CharMaps = read_json(&dir.join(MAPS_FILE))?;

    model.validate()?;
    let index = CharIndex::from_maps(maps.char2idx, maps.idx2char)?;
    if model.vocab_size() != index.vocab_size() {
        return Err(CharModelError::VocabMismatch {
            model: model.vocab_size(),
            maps: index.vocab_size(),
        });
    }
    if maps.maxlen == 0 {
        return Err(CharModelError::InvalidMaps("maxlen is zero".into()));
    }

    tracing::debug!(
        "Loaded char model: {} classes, maxlen {}",
        index.vocab_size(),
        maps.maxlen
    );
    Ok((model, index, maps.maxlen))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CharModelError> {
    let io_err = |source| CharModelError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| CharModelError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CharModelError> {
    let file = File::open(path).map_err(|source| CharModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CharModelError::Json {
        path: path.to_path_buf(),
        source,
    })
}
