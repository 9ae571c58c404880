//! On-screen key grid and hit testing.

use crate::config::LayoutConfig;
use std::fmt;

const ROWS: [&str; 4] = ["1234567890", "QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// What a key does when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCap {
    Char(char),
    Space,
    Backspace,
    Complete,
}

impl KeyCap {
    pub fn label(&self) -> String {
        match self {
            KeyCap::Char(c) => c.to_string(),
            KeyCap::Space => "SPACE".into(),
            KeyCap::Backspace => "DELETE".into(),
            KeyCap::Complete => "COMPLETE".into(),
        }
    }
}

impl fmt::Display for KeyCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A key and its rectangle in frame pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDef {
    pub cap: KeyCap,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl KeyDef {
    /// Strictly inside: points on the border do not count.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        self.x < px && px < self.x + self.width && self.y < py && py < self.y + self.height
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    rows: Vec<Vec<KeyDef>>,
}

impl KeyboardLayout {
    /// Character rows first, then SPACE / DELETE / COMPLETE on the last row.
    pub fn from_config(config: &LayoutConfig) -> Self {
        let step_x = config.key_width + config.spacing_x;
        let step_y = config.key_height + config.spacing_y;
        let key = |cap, col: i32, row: i32| KeyDef {
            cap,
            x: config.origin_x + col * step_x,
            y: config.origin_y + row * step_y,
            width: config.key_width,
            height: config.key_height,
        };

        let mut rows: Vec<Vec<KeyDef>> = ROWS
            .iter()
            .zip(0..)
            .map(|(chars, row)| {
                chars
                    .chars()
                    .zip(0..)
                    .map(|(c, col)| key(KeyCap::Char(c), col, row))
                    .collect()
            })
            .collect();

        let specials = [KeyCap::Space, KeyCap::Backspace, KeyCap::Complete];
        let last_row = ROWS.len() as i32;
        rows.push(
            specials
                .into_iter()
                .zip(0..)
                .map(|(cap, col)| key(cap, col, last_row))
                .collect(),
        );

        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<KeyDef>] {
        &self.rows
    }

    pub fn keys(&self) -> impl Iterator<Item = &KeyDef> {
        self.rows.iter().flatten()
    }

    /// The key under the pointer, if any.
    pub fn hit_test(&self, px: i32, py: i32) -> Option<KeyCap> {
        let hit = self.keys().find(|k| k.contains(px, py)).map(|k| k.cap);
        if let Some(cap) = hit {
            tracing::trace!("pointer ({}, {}) over {}", px, py, cap);
        }
        hit
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}
