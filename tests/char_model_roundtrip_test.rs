/// Integration tests for training, persisting and reloading the char model
use pinchkey::autocomplete::Suggester;
use pinchkey::charmodel::{self, CharModelError, CharPredictor, MAPS_FILE, MODEL_FILE};
use pinchkey::config::ModelConfig;
use std::fs;

fn config() -> ModelConfig {
    ModelConfig {
        epochs: 3,
        batch_size: 16,
        learning_rate: 0.01,
        seed: Some(42),
        ..ModelConfig::default()
    }
}

fn corpus() -> Vec<String> {
    ["hola", "hoy", "casa", "cosa", "niño", "sol"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_reloaded_model_predicts_the_same() {
    let dir = tempfile::tempdir().unwrap();
    let trained = charmodel::train(&corpus(), &config()).unwrap();
    trained.save(dir.path()).unwrap();

    assert!(dir.path().join(MODEL_FILE).exists());
    assert!(dir.path().join(MAPS_FILE).exists());

    let expected_index = trained.index.clone();
    let expected_maxlen = trained.maxlen;
    let in_memory = trained.into_predictor();
    let reloaded = CharPredictor::load(dir.path()).unwrap();

    assert_eq!(reloaded.index(), &expected_index);
    assert_eq!(reloaded.maxlen(), expected_maxlen);
    for text in ["ho", "ca", "niñ", "", "xyz", "una casa muy grande"] {
        assert_eq!(
            reloaded.predict_next_char(text),
            in_memory.predict_next_char(text),
            "prediction differs for {:?}",
            text
        );
        assert_eq!(reloaded.suggest(text), in_memory.suggest(text));
    }
}

#[test]
fn test_maxlen_is_longest_prefix() {
    let trained = charmodel::train(&corpus(), &config()).unwrap();
    assert_eq!(trained.maxlen, 3);
    // a c h i l n o s y ñ + padding
    assert_eq!(trained.index.vocab_size(), 11);
}

#[test]
fn test_maps_from_another_run_are_rejected() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    charmodel::train(&corpus(), &config())
        .unwrap()
        .save(a.path())
        .unwrap();
    let small = vec!["ab".to_string()];
    charmodel::train(&small, &config())
        .unwrap()
        .save(b.path())
        .unwrap();

    fs::copy(b.path().join(MAPS_FILE), a.path().join(MAPS_FILE)).unwrap();
    assert!(matches!(
        CharPredictor::load(a.path()),
        Err(CharModelError::VocabMismatch { .. })
    ));
}

#[test]
fn test_corrupt_model_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    charmodel::train(&corpus(), &config())
        .unwrap()
        .save(dir.path())
        .unwrap();
    fs::write(dir.path().join(MODEL_FILE), "{\"embedding\": 3}").unwrap();
    assert!(matches!(
        CharPredictor::load(dir.path()),
        Err(CharModelError::Json { .. })
    ));
}

#[test]
fn test_gapped_maps_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    charmodel::train(&corpus(), &config())
        .unwrap()
        .save(dir.path())
        .unwrap();
    fs::write(
        dir.path().join(MAPS_FILE),
        r#"{"char2idx": {"a": 1, "b": 5}, "idx2char": {"1": "a", "5": "b"}, "maxlen": 3}"#,
    )
    .unwrap();
    assert!(matches!(
        CharPredictor::load(dir.path()),
        Err(CharModelError::InvalidMaps(_))
    ));
}
