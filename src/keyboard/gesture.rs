//! Pinch detection and key-activation debouncing.

use super::layout::KeyCap;
use std::time::Duration;

pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;

/// One hand landmark in normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn to_pixels(self, width: u32, height: u32) -> (i32, i32) {
        ((self.x * width as f32) as i32, (self.y * height as f32) as i32)
    }
}

/// Pointer and thumb positions in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    pub pointer: (i32, i32),
    pub thumb: (i32, i32),
}

impl HandPose {
    /// `None` when the frame has too few landmarks to locate both fingertips.
    pub fn from_landmarks(landmarks: &[Landmark], width: u32, height: u32) -> Option<Self> {
        let pointer = landmarks.get(INDEX_TIP)?.to_pixels(width, height);
        let thumb = landmarks.get(THUMB_TIP)?.to_pixels(width, height);
        Some(Self { pointer, thumb })
    }

    pub fn pinch_distance(&self) -> f32 {
        // Saturated pixel coordinates can be i32::MIN and i32::MAX at once
        let dx = (i64::from(self.pointer.0) - i64::from(self.thumb.0)) as f32;
        let dy = (i64::from(self.pointer.1) - i64::from(self.thumb.1)) as f32;
        dx.hypot(dy)
    }
}

/// A debounced activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key: KeyCap,
    pub at: Duration,
}

/// Turns a per-frame pinch signal into discrete key events.
///
/// A pinch fires when it is closer than the threshold and either the key
/// changed since the last event or the cooldown has passed.
#[derive(Debug, Clone)]
pub struct Debouncer {
    threshold: f32,
    cooldown: Duration,
    last: Option<(KeyCap, Duration)>,
}

impl Debouncer {
    pub fn new(threshold: f32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            last: None,
        }
    }

    pub fn observe(
        &mut self,
        pinch_distance: f32,
        hovered: Option<KeyCap>,
        now: Duration,
    ) -> Option<KeyEvent> {
        let key = hovered?;
        if pinch_distance >= self.threshold {
            return None;
        }

        let fire = match self.last {
            None => true,
            Some((last_key, last_at)) => {
                key != last_key || now.saturating_sub(last_at) > self.cooldown
            }
        };
        if !fire {
            return None;
        }

        self.last = Some((key, now));
        tracing::debug!("key {} at {:?} (pinch {:.1}px)", key, now, pinch_distance);
        Some(KeyEvent { key, at: now })
    }

    pub fn last_key(&self) -> Option<KeyCap> {
        self.last.map(|(k, _)| k)
    }
}
