use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Corpus shared by the vocabulary engine and the char-model trainer
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            vocabulary: VocabularyConfig::default(),
            keyboard: KeyboardConfig::default(),
            feedback: FeedbackConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

fn default_corpus_path() -> String {
    "spanish_corpus.txt".into()
}

// ============================================================================
// Vocabulary Config
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct VocabularyConfig {
    /// Shortest token kept in the vocabulary (characters)
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    /// Longest token kept in the vocabulary (characters)
    #[serde(default = "default_max_len")]
    pub max_len: usize,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            min_len: default_min_len(),
            max_len: default_max_len(),
        }
    }
}

fn default_min_len() -> usize {
    3
}

fn default_max_len() -> usize {
    15
}

// ============================================================================
// Keyboard Config
// ============================================================================

/// Which autocomplete strategy feeds the suggestion line
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestEngine {
    /// Prefix match against the corpus vocabulary (default)
    #[default]
    Vocabulary,
    /// Next-character lookahead from the trained char model
    CharModel,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeyboardConfig {
    /// Pinch distance (pixels) below which a hovered key is activated
    #[serde(default = "default_click_threshold")]
    pub click_threshold_px: f32,
    /// Minimum time before the same key can fire again
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Minimum time between two suggestion recomputations
    #[serde(default = "default_suggest_interval_ms")]
    pub suggest_interval_ms: u64,
    #[serde(default)]
    pub engine: SuggestEngine,
    /// Landmark stream: "-" for stdin, otherwise a file or FIFO path
    #[serde(default = "default_landmarks")]
    pub landmarks: String,
    /// "direct" or "clipboard"
    #[serde(default = "default_input_method")]
    pub input_method: String,
    /// Send keystrokes to the OS (false = log only)
    #[serde(default = "default_inject")]
    pub inject: bool,
    #[serde(default = "default_quit_key")]
    pub quit_key: char,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            click_threshold_px: default_click_threshold(),
            cooldown_ms: default_cooldown_ms(),
            suggest_interval_ms: default_suggest_interval_ms(),
            engine: SuggestEngine::default(),
            landmarks: default_landmarks(),
            input_method: default_input_method(),
            inject: default_inject(),
            quit_key: default_quit_key(),
            layout: LayoutConfig::default(),
        }
    }
}

impl KeyboardConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn suggest_interval(&self) -> Duration {
        Duration::from_millis(self.suggest_interval_ms)
    }
}

fn default_click_threshold() -> f32 {
    40.0
}

fn default_cooldown_ms() -> u64 {
    500
}

fn default_suggest_interval_ms() -> u64 {
    500
}

fn default_landmarks() -> String {
    "-".into()
}

fn default_input_method() -> String {
    "direct".into()
}

fn default_inject() -> bool {
    true
}

fn default_quit_key() -> char {
    'q'
}

/// Key grid geometry, in frame pixels
#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,
    #[serde(default = "default_key_size")]
    pub key_width: i32,
    #[serde(default = "default_key_size")]
    pub key_height: i32,
    #[serde(default = "default_origin_x")]
    pub origin_x: i32,
    #[serde(default = "default_origin_y")]
    pub origin_y: i32,
    #[serde(default = "default_spacing")]
    pub spacing_x: i32,
    #[serde(default = "default_spacing")]
    pub spacing_y: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            key_width: default_key_size(),
            key_height: default_key_size(),
            origin_x: default_origin_x(),
            origin_y: default_origin_y(),
            spacing_x: default_spacing(),
            spacing_y: default_spacing(),
        }
    }
}

fn default_frame_width() -> u32 {
    1280
}
fn default_frame_height() -> u32 {
    720
}
fn default_key_size() -> i32 {
    90
}
fn default_origin_x() -> i32 {
    100
}
fn default_origin_y() -> i32 {
    50
}
fn default_spacing() -> i32 {
    30
}

// ============================================================================
// Feedback Config
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct FeedbackConfig {
    /// Play a click on every key activation
    #[serde(default = "default_feedback_enabled")]
    pub enabled: bool,
    /// WAV file for the click; a short tone is used when it is missing
    #[serde(default = "default_click_sound")]
    pub click_sound: String,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: default_feedback_enabled(),
            click_sound: default_click_sound(),
        }
    }
}

fn default_feedback_enabled() -> bool {
    true
}

fn default_click_sound() -> String {
    "click.wav".into()
}

// ============================================================================
// Char Model Config
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Directory holding autocomplete_lstm.json and char_maps.json
    #[serde(default = "default_model_dir")]
    pub dir: String,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Fixed RNG seed; unset means every run starts from fresh entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            seed: None,
        }
    }
}

fn default_model_dir() -> String {
    "model".into()
}

fn default_epochs() -> usize {
    30
}

fn default_batch_size() -> usize {
    128
}

fn default_learning_rate() -> f32 {
    0.001
}

impl Config {
    /// Load a config file, falling back to defaults when it is missing or invalid
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }
        match fs::read_to_string(path) {
            Ok(s) => Self::parse(&s).unwrap_or_else(|e| {
                tracing::warn!("Invalid config {}: {}, using defaults", path.display(), e);
                Config::default()
            }),
            Err(e) => {
                tracing::warn!("Could not read {}: {}, using defaults", path.display(), e);
                Config::default()
            }
        }
    }

    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.corpus_path, "spanish_corpus.txt");
        assert_eq!(config.vocabulary.min_len, 3);
        assert_eq!(config.vocabulary.max_len, 15);
        assert_eq!(config.keyboard.click_threshold_px, 40.0);
        assert_eq!(config.keyboard.cooldown(), Duration::from_millis(500));
        assert_eq!(config.keyboard.engine, SuggestEngine::Vocabulary);
        assert_eq!(config.keyboard.layout.key_width, 90);
        assert_eq!(config.model.epochs, 30);
        assert_eq!(config.model.batch_size, 128);
        assert!(config.model.seed.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            corpus_path = "words.txt"

            [keyboard]
            engine = "char-model"
            cooldown_ms = 250

            [model]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.corpus_path, "words.txt");
        assert_eq!(config.keyboard.engine, SuggestEngine::CharModel);
        assert_eq!(config.keyboard.cooldown_ms, 250);
        assert_eq!(config.keyboard.suggest_interval_ms, 500);
        assert_eq!(config.model.seed, Some(7));
        assert_eq!(config.model.dir, "model");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("definitely/not/here.toml"));
        assert_eq!(config.keyboard.quit_key, 'q');
    }
}
