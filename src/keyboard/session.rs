//! Per-frame keyboard session.
//!
//! All mutable state of a typing session lives here and is advanced by
//! [`Session::update`] once per landmark frame. The session never touches the
//! OS: it hands back what happened and what to inject.

use super::buffer::{Keystroke, TextBuffer};
use super::gesture::{Debouncer, HandPose, KeyEvent, Landmark};
use super::layout::{KeyCap, KeyboardLayout};
use crate::autocomplete::Suggester;
use crate::config::KeyboardConfig;
use std::time::Duration;

/// Decides when the suggestion is worth recomputing.
#[derive(Debug, Clone)]
pub struct SuggestThrottle {
    interval: Duration,
    last_text: String,
    last_at: Option<Duration>,
}

impl SuggestThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_text: String::new(),
            last_at: None,
        }
    }

    /// True when `text` changed since the last run and the interval has passed.
    /// Records the run when it returns true.
    pub fn should_run(&mut self, text: &str, now: Duration) -> bool {
        if text == self.last_text {
            return false;
        }
        if let Some(last) = self.last_at {
            if now.saturating_sub(last) <= self.interval {
                return false;
            }
        }
        self.last_text = text.to_string();
        self.last_at = Some(now);
        true
    }
}

/// Everything one frame produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameUpdate {
    pub pose: Option<HandPose>,
    pub hovered: Option<KeyCap>,
    pub pinch_distance: Option<f32>,
    pub event: Option<KeyEvent>,
    pub keystrokes: Vec<Keystroke>,
}

pub struct Session {
    layout: KeyboardLayout,
    debouncer: Debouncer,
    buffer: TextBuffer,
    throttle: SuggestThrottle,
    suggester: Box<dyn Suggester>,
    frame_width: u32,
    frame_height: u32,
}

impl Session {
    pub fn new(config: &KeyboardConfig, suggester: Box<dyn Suggester>) -> Self {
        Self {
            layout: KeyboardLayout::from_config(&config.layout),
            debouncer: Debouncer::new(config.click_threshold_px, config.cooldown()),
            buffer: TextBuffer::new(),
            throttle: SuggestThrottle::new(config.suggest_interval()),
            suggester,
            frame_width: config.layout.frame_width,
            frame_height: config.layout.frame_height,
        }
    }

    /// Advance one frame: refresh the suggestion if due, then resolve the gesture.
    pub fn update(&mut self, landmarks: &[Landmark], now: Duration) -> FrameUpdate {
        self.refresh_suggestion(now);

        let Some(pose) = HandPose::from_landmarks(landmarks, self.frame_width, self.frame_height)
        else {
            return FrameUpdate::default();
        };

        let (px, py) = pose.pointer;
        let hovered = self.layout.hit_test(px, py);
        let distance = pose.pinch_distance();
        let event = self.debouncer.observe(distance, hovered, now);
        let keystrokes = match event {
            Some(e) => self.buffer.apply(e.key),
            None => Vec::new(),
        };

        FrameUpdate {
            pose: Some(pose),
            hovered,
            pinch_distance: Some(distance),
            event,
            keystrokes,
        }
    }

    fn refresh_suggestion(&mut self, now: Duration) {
        if !self.throttle.should_run(self.buffer.text(), now) {
            return;
        }
        let suggestion = self.suggester.suggest(self.buffer.text());
        tracing::debug!("suggestion for {:?}: {:?}", self.buffer.text(), suggestion);
        self.buffer.set_suggestion(suggestion);
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.buffer.suggestion()
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }
}
