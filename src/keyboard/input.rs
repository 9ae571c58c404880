//! Keystroke injection
//!
//! The session produces [`Keystroke`]s; an [`Injector`] replays them.
//! - [`TypingInput`]: real OS input through enigo, with two text methods:
//!   - **Direct**: enigo's native text input (default)
//!   - **Clipboard**: copy to clipboard, then send Cmd/Ctrl+V
//! - [`LogInjector`]: logs instead of typing (dry run)
//! - [`RecordingInjector`]: keeps everything it was asked to send

use super::buffer::Keystroke;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("keyboard error: {0}")]
    Enigo(String),
    #[error("clipboard error: {0}")]
    Clipboard(String),
}

/// Something that can replay keystrokes into the focused application.
pub trait Injector {
    fn send(&mut self, keystroke: &Keystroke) -> Result<(), InjectError>;

    fn send_all(&mut self, keystrokes: &[Keystroke]) -> Result<(), InjectError> {
        for k in keystrokes {
            self.send(k)?;
        }
        Ok(())
    }
}

/// How text (as opposed to single keys) reaches the OS
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InputMethod {
    #[default]
    Direct,
    Clipboard,
}

impl InputMethod {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "clipboard" => InputMethod::Clipboard,
            _ => InputMethod::Direct,
        }
    }
}

/// Dry-run injector: logs each keystroke.
#[derive(Debug, Default)]
pub struct LogInjector;

impl Injector for LogInjector {
    fn send(&mut self, keystroke: &Keystroke) -> Result<(), InjectError> {
        tracing::info!("inject {:?}", keystroke);
        Ok(())
    }
}

/// Collects keystrokes in memory.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    pub sent: Vec<Keystroke>,
}

impl Injector for RecordingInjector {
    fn send(&mut self, keystroke: &Keystroke) -> Result<(), InjectError> {
        self.sent.push(keystroke.clone());
        Ok(())
    }
}

#[cfg(feature = "typing")]
pub use os::TypingInput;

#[cfg(feature = "typing")]
mod os {
    use super::{InjectError, Injector, InputMethod, Keystroke};
    use arboard::Clipboard;
    use enigo::{Direction, Enigo, Key, Keyboard, Settings};
    use std::thread;
    use std::time::Duration;

    /// OS keyboard input through enigo
    pub struct TypingInput {
        enigo: Enigo,
        clipboard: Option<Clipboard>,
        method: InputMethod,
    }

    impl TypingInput {
        pub fn new(method: InputMethod) -> Result<Self, InjectError> {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| InjectError::Enigo(format!("failed to initialize enigo: {}", e)))?;
            let clipboard = match method {
                InputMethod::Clipboard => Some(Clipboard::new().map_err(|e| {
                    InjectError::Clipboard(format!("failed to initialize clipboard: {}", e))
                })?),
                InputMethod::Direct => None,
            };
            Ok(Self {
                enigo,
                clipboard,
                method,
            })
        }

        fn click(&mut self, key: Key) -> Result<(), InjectError> {
            self.enigo
                .key(key, Direction::Click)
                .map_err(|e| InjectError::Enigo(format!("failed to send key: {}", e)))
        }

        fn type_text(&mut self, text: &str) -> Result<(), InjectError> {
            if text.is_empty() {
                return Ok(());
            }
            match self.method {
                InputMethod::Direct => self.type_direct(text),
                InputMethod::Clipboard => match self.type_via_clipboard(text) {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        tracing::warn!("clipboard paste failed: {}, typing directly", e);
                        self.type_direct(text)
                    }
                },
            }
        }

        fn type_direct(&mut self, text: &str) -> Result<(), InjectError> {
            self.enigo
                .text(text)
                .map_err(|e| InjectError::Enigo(format!("failed to type text: {}", e)))
        }

        fn type_via_clipboard(&mut self, text: &str) -> Result<(), InjectError> {
            let Some(clipboard) = self.clipboard.as_mut() else {
                return Err(InjectError::Clipboard("clipboard not initialized".into()));
            };
            let previous = clipboard.get_text().ok();
            clipboard
                .set_text(text)
                .map_err(|e| InjectError::Clipboard(format!("failed to set clipboard: {}", e)))?;
            thread::sleep(Duration::from_millis(50));

            let pasted = self.paste();
            thread::sleep(Duration::from_millis(100));

            if let (Some(old), Some(clipboard)) = (previous, self.clipboard.as_mut()) {
                let _ = clipboard.set_text(old);
            }
            pasted
        }

        fn paste(&mut self) -> Result<(), InjectError> {
            #[cfg(target_os = "macos")]
            let modifier = Key::Meta;
            #[cfg(not(target_os = "macos"))]
            let modifier = Key::Control;

            let err = |e: enigo::InputError| InjectError::Enigo(format!("paste failed: {}", e));
            self.enigo.key(modifier, Direction::Press).map_err(err)?;
            thread::sleep(Duration::from_millis(10));
            let clicked = self.enigo.key(Key::Unicode('v'), Direction::Click).map_err(err);
            thread::sleep(Duration::from_millis(50));
            self.enigo.key(modifier, Direction::Release).map_err(err)?;
            clicked
        }
    }

    impl Injector for TypingInput {
        fn send(&mut self, keystroke: &Keystroke) -> Result<(), InjectError> {
            match keystroke {
                Keystroke::Text(s) => self.type_text(s),
                Keystroke::Space => self.click(Key::Space),
                Keystroke::Backspace => self.click(Key::Backspace),
            }
        }
    }
}

/// Build the injector the configuration asks for.
pub fn create_injector(inject: bool, method: &str) -> Result<Box<dyn Injector>, InjectError> {
    if !inject {
        return Ok(Box::new(LogInjector));
    }
    os_injector(InputMethod::from_str(method))
}

#[cfg(feature = "typing")]
fn os_injector(method: InputMethod) -> Result<Box<dyn Injector>, InjectError> {
    Ok(Box::new(TypingInput::new(method)?))
}

#[cfg(not(feature = "typing"))]
fn os_injector(_method: InputMethod) -> Result<Box<dyn Injector>, InjectError> {
    tracing::warn!("built without the `typing` feature, keystrokes are only logged");
    Ok(Box::new(LogInjector))
}
