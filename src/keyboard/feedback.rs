//! Audible click on every key activation.

use crate::config::FeedbackConfig;

#[cfg(feature = "audio")]
mod sound {
    use anyhow::{Context, Result};
    use rodio::source::SineWave;
    use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
    use std::io::Cursor;
    use std::path::Path;
    use std::time::Duration;

    pub struct Player {
        // Option so Drop can forget it
        stream: Option<OutputStream>,
        sink: Sink,
        wav: Option<Vec<u8>>,
    }

    impl Player {
        pub fn open(click_sound: &Path) -> Result<Self> {
            let stream =
                OutputStreamBuilder::open_default_stream().context("no audio output device")?;
            let sink = Sink::connect_new(stream.mixer());
            let wav = match std::fs::read(click_sound) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!(
                        "{}: {}, using a generated tone",
                        click_sound.display(),
                        e
                    );
                    None
                }
            };
            Ok(Self {
                stream: Some(stream),
                sink,
                wav,
            })
        }

        pub fn play(&self) {
            if let Some(bytes) = &self.wav {
                match Decoder::new(Cursor::new(bytes.clone())) {
                    Ok(source) => {
                        self.sink.append(source);
                        return;
                    }
                    Err(e) => tracing::debug!("click decode failed: {}", e),
                }
            }
            let tone = SineWave::new(880.0)
                .take_duration(Duration::from_millis(40))
                .amplify(0.2);
            self.sink.append(tone);
        }
    }

    impl Drop for Player {
        fn drop(&mut self) {
            // Dropping the stream prints a notice on stderr
            if let Some(stream) = self.stream.take() {
                std::mem::forget(stream);
            }
        }
    }
}

/// Plays the click cue, or nothing when disabled.
pub struct ClickCue {
    #[cfg(feature = "audio")]
    player: Option<sound::Player>,
}

impl ClickCue {
    /// A cue that never makes a sound.
    pub fn silent() -> Self {
        Self {
            #[cfg(feature = "audio")]
            player: None,
        }
    }

    /// Opens the default output device when feedback is enabled.
    pub fn from_config(config: &FeedbackConfig) -> anyhow::Result<Self> {
        if !config.enabled {
            return Ok(Self::silent());
        }
        Self::open(config)
    }

    #[cfg(feature = "audio")]
    fn open(config: &FeedbackConfig) -> anyhow::Result<Self> {
        let player = sound::Player::open(std::path::Path::new(&config.click_sound))?;
        Ok(Self {
            player: Some(player),
        })
    }

    #[cfg(not(feature = "audio"))]
    fn open(_config: &FeedbackConfig) -> anyhow::Result<Self> {
        tracing::warn!("built without the `audio` feature, click cue disabled");
        Ok(Self::silent())
    }

    #[cfg(feature = "audio")]
    pub fn click(&self) {
        if let Some(player) = &self.player {
            player.play();
        }
    }

    #[cfg(not(feature = "audio"))]
    pub fn click(&self) {}
}
