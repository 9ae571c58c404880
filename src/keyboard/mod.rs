//! Gesture-driven virtual keyboard
//!
//! Hand landmarks come in one frame at a time; a pinch over an on-screen key
//! types it into whatever application has focus.
//!
//! # Features
//!
//! - **Pinch to press**: thumb and index fingertip closer than a threshold
//!   activate the key under the index finger
//! - **Debouncing**: a held pinch repeats only after a cooldown, or at once on
//!   a different key
//! - **Autocomplete**: a throttled suggestion for the word being typed, applied
//!   with the COMPLETE key
//! - **Configurable input method**: direct typing (default) or clipboard+paste
//! - **Click cue**: a short sound on every activation

pub mod buffer;
pub mod feedback;
pub mod gesture;
pub mod input;
pub mod landmarks;
pub mod layout;
pub mod overlay;
pub mod session;

pub use buffer::{Keystroke, TextBuffer};
pub use feedback::ClickCue;
pub use gesture::{Debouncer, HandPose, KeyEvent, Landmark};
pub use input::{InjectError, Injector, InputMethod, RecordingInjector, create_injector};
pub use landmarks::{JsonLinesSource, LandmarkSource};
pub use layout::{KeyCap, KeyDef, KeyboardLayout};
pub use overlay::{Overlay, OverlayState};
pub use session::{FrameUpdate, Session, SuggestThrottle};
