//! Hand-landmark frames from an external pose estimator.
//!
//! One JSON object per line: `{"landmarks": [[x, y], ...]}` with normalized
//! coordinates. An empty list is a frame without a hand.

use super::gesture::Landmark;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct LandmarkFrame {
    #[serde(default)]
    landmarks: Vec<[f32; 2]>,
}

pub trait LandmarkSource {
    /// Next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Vec<Landmark>>>;
}

pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_no: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
        }
    }
}

impl JsonLinesSource<Box<dyn BufRead>> {
    /// `-` reads stdin, anything else is opened as a file or FIFO.
    pub fn open(location: &str) -> Result<Self> {
        let reader: Box<dyn BufRead> = if location == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(Path::new(location))
                .with_context(|| format!("cannot open landmark stream {}", location))?;
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<Landmark>>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let frame: LandmarkFrame = serde_json::from_str(trimmed)
                .with_context(|| format!("bad landmark frame on line {}", self.line_no))?;
            return Ok(Some(
                frame
                    .landmarks
                    .into_iter()
                    .map(|[x, y]| Landmark::new(x, y))
                    .collect(),
            ));
        }
    }
}
