//! One-shot training job for the char model.

use super::artifact::save_artifacts;
use super::dataset::Dataset;
use super::index::CharIndex;
use super::lstm::{Adam, CharModel};
use super::predict::CharPredictor;
use super::CharModelError;
use crate::config::ModelConfig;
use ndarray::Axis;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Loss and accuracy over one pass through the data.
#[derive(Debug, Clone, Copy)]
pub struct EpochStats {
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f32,
}

/// What [`train_with_progress`] reports while it runs.
#[derive(Debug, Clone, Copy)]
pub enum TrainProgress<'a> {
    /// The untrained model, before the first epoch.
    Started { model: &'a CharModel, maxlen: usize },
    Epoch(&'a EpochStats),
}

/// A trained network together with the maps it was trained against.
pub struct TrainedModel {
    pub model: CharModel,
    pub index: CharIndex,
    pub maxlen: usize,
    pub history: Vec<EpochStats>,
}

impl TrainedModel {
    pub fn save(&self, dir: &Path) -> Result<(), CharModelError> {
        save_artifacts(dir, &self.model, &self.index, self.maxlen)
    }

    pub fn into_predictor(self) -> CharPredictor {
        CharPredictor::from_parts(self.model, self.index, self.maxlen)
    }
}

/// Read a one-word-per-line corpus. Line terminators are dropped, nothing else.
pub fn read_corpus_words(path: &Path) -> Result<Vec<String>, CharModelError> {
    let text = fs::read_to_string(path).map_err(|source| CharModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(String::from).collect())
}

/// Build the character maps and samples from `words` and fit a fresh model.
pub fn train<S: AsRef<str>>(
    words: &[S],
    config: &ModelConfig,
) -> Result<TrainedModel, CharModelError> {
    train_with_progress(words, config, |_| {})
}

/// Same as [`train`], calling `on_progress` once the model is built and
/// after every epoch.
pub fn train_with_progress<S, F>(
    words: &[S],
    config: &ModelConfig,
    mut on_progress: F,
) -> Result<TrainedModel, CharModelError>
where
    S: AsRef<str>,
    F: FnMut(TrainProgress<'_>),
{
    let index = CharIndex::from_words(words);
    let dataset = Dataset::from_words(words, &index)?;
    let vocab_size = index.vocab_size();

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let inputs = dataset.inputs();
    let targets = dataset.targets(vocab_size);
    let mut model = CharModel::new(vocab_size, &mut rng);
    let mut adam = Adam::new(&model, config.learning_rate);

    tracing::info!(
        "Training on {} samples, {} classes, maxlen {}",
        dataset.len(),
        vocab_size,
        dataset.maxlen
    );
    on_progress(TrainProgress::Started {
        model: &model,
        maxlen: dataset.maxlen,
    });

    let batch_size = config.batch_size.max(1);
    let mut order: Vec<usize> = (0..dataset.len()).collect();
    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let started = Instant::now();
        order.shuffle(&mut rng);

        let mut loss_sum = 0.0;
        let mut correct = 0;
        for batch in order.chunks(batch_size) {
            let batch_inputs = inputs.select(Axis(0), batch);
            let batch_targets = targets.select(Axis(0), batch);
            let (stats, grads) = model.gradients(&batch_inputs, &batch_targets);
            adam.apply(&mut model, &grads);
            loss_sum += stats.loss * batch.len() as f32;
            correct += stats.correct;
        }

        let stats = EpochStats {
            epoch,
            loss: loss_sum / dataset.len() as f32,
            accuracy: correct as f32 / dataset.len() as f32,
        };
        tracing::debug!(
            "epoch {} took {:.0}ms",
            epoch,
            started.elapsed().as_secs_f64() * 1000.0
        );
        on_progress(TrainProgress::Epoch(&stats));
        history.push(stats);
    }

    Ok(TrainedModel {
        model,
        index,
        maxlen: dataset.maxlen,
        history,
    })
}
