//! Terminal overlay: key grid, hovered key, typed text and suggestion.

use super::layout::{KeyCap, KeyboardLayout};
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use std::io::{self, Write, stdout};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const HOVER: &str = "\x1b[7;1m";
const DIM: &str = "\x1b[90m";
const SUGGEST: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";

/// What the overlay shows for one frame.
pub struct OverlayState<'a> {
    pub hovered: Option<KeyCap>,
    pub pinch_distance: Option<f32>,
    pub text: &'a str,
    pub suggestion: Option<&'a str>,
}

/// Build the overlay lines (with ANSI colors) for a terminal `width` columns wide.
pub fn render_lines(layout: &KeyboardLayout, state: &OverlayState, width: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(layout.rows().len() + 3);

    for row in layout.rows() {
        let mut line = String::new();
        for key in row {
            let label = format!("[{}]", key.cap.label());
            if state.hovered == Some(key.cap) {
                line.push_str(&format!("{}{}{} ", HOVER, label, RESET));
            } else {
                line.push_str(&label);
                line.push(' ');
            }
        }
        lines.push(line.trim_end().to_string());
    }

    let pinch = match state.pinch_distance {
        Some(d) => format!("pinch {:>4.0}px", d),
        None => "no hand".to_string(),
    };
    lines.push(format!("{}{}{}", DIM, pinch, RESET));
    lines.push(format!("> {}", tail_to_width(state.text, width.saturating_sub(2))));
    lines.push(match state.suggestion {
        Some(s) => format!("{}Suggestion: {}{}", SUGGEST, s, RESET),
        None => format!("{}Suggestion:{}", DIM, RESET),
    });
    lines
}

/// The rightmost part of `text` that fits in `width` columns.
pub fn tail_to_width(text: &str, width: usize) -> &str {
    if text.width() <= width {
        return text;
    }
    let mut start = text.len();
    let mut used = 0;
    for (i, c) in text.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = i;
    }
    &text[start..]
}

/// Raw-mode terminal surface that redraws in place.
pub struct Overlay {
    drawn_lines: usize,
    quit_key: char,
}

impl Overlay {
    pub fn new(quit_key: char) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), cursor::Hide)?;
        Ok(Self {
            drawn_lines: 0,
            quit_key,
        })
    }

    pub fn draw(&mut self, layout: &KeyboardLayout, state: &OverlayState) -> io::Result<()> {
        let mut out = stdout();
        let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);

        if self.drawn_lines > 0 {
            queue!(out, cursor::MoveUp(self.drawn_lines as u16))?;
        }
        queue!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::FromCursorDown)
        )?;

        let lines = render_lines(layout, state, width);
        for line in &lines {
            queue!(
                out,
                crossterm::style::Print(line),
                crossterm::style::Print("\r\n")
            )?;
        }
        out.flush()?;
        self.drawn_lines = lines.len();
        Ok(())
    }

    /// Drain pending terminal events; true when the user asked to quit.
    pub fn poll_quit(&self) -> io::Result<bool> {
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(true);
                }
                match key.code {
                    KeyCode::Esc => return Ok(true),
                    KeyCode::Char(c) if c == self.quit_key => return Ok(true),
                    _ => {}
                }
            }
        }
        Ok(false)
    }

    pub fn restore(&self) -> io::Result<()> {
        execute!(stdout(), cursor::Show, cursor::MoveToColumn(0))?;
        terminal::disable_raw_mode()
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
