//! Hands-free text entry with a pinch-operated virtual keyboard.
//!
//! - [`keyboard`]: gestures, key actions, the per-frame session and its I/O
//! - [`autocomplete`]: suggestion strategies
//! - [`charmodel`]: the character-level next-character model
//! - [`config`]: `config.toml` loading

pub mod autocomplete;
pub mod charmodel;
pub mod config;
pub mod keyboard;
