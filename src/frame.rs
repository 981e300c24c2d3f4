use serde_derive::{Deserialize, Serialize};
use std::io::BufRead;

use crate::detection::Detection;
use crate::error::Result;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub timestamp: f64, // in seconds
    pub detections: Vec<Detection>,
}

impl Frame {
    #[inline]
    pub fn new(timestamp: f64, detections: Vec<Detection>) -> Self {
        Self {
            timestamp,
            detections,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Parses one `<ts>:<json array of detections>` line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let idx = match line.find(':') {
            Some(idx) => idx,
            None => {
                tracing::warn!(line, "wrong frame format: expected `:`");
                return None;
            }
        };
        let (ts, vector) = line.split_at(idx);

        match (ts.trim().parse::<f64>(), serde_json::from_str::<Vec<Detection>>(&vector[1..])) {
            (Ok(timestamp), Ok(detections)) => Some(Self::new(timestamp, detections)),
            (Ok(_), Err(err)) => {
                tracing::warn!(%err, line, "wrong frame format: parse json failed");
                None
            }
            (Err(err), _) => {
                tracing::warn!(%err, line, "wrong frame format: parse timestamp failed");
                None
            }
        }
    }

    /// Reads a detections dump, one frame per line. Malformed lines are
    /// skipped (reported once by `parse_line`); read errors are returned.
    pub fn read_lines<R: BufRead>(reader: R) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(frame) = Self::parse_line(&line) {
                frames.push(frame);
            }
        }

        Ok(frames)
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}
