//! Replays precomputed face detections from a JSON lines file.
//!
//! Each line is one video frame:
//!
//! ```text
//! {"width": 640, "height": 480, "faces": [{"box": [t, r, b, l], "embedding": [...]}]}
//! ```
//!
//! An optional first line `{"frame_rate": 29.97}` declares the source frame
//! rate. Blank lines are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::Context;
use facecluster::{Detection, EmbeddingProvider, FaceBox, FaceClusterError, FrameInfo};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FrameRecord {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub faces: Vec<FaceRecord>,
}

#[derive(Debug, Deserialize)]
pub struct FaceRecord {
    #[serde(rename = "box", default)]
    pub bbox: Option<FaceBox>,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct Header {
    frame_rate: f64,
}

impl FrameInfo for FrameRecord {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Hands out the detections stored with each frame.
pub struct ReplayProvider;

impl EmbeddingProvider for ReplayProvider {
    type Frame = FrameRecord;

    fn detect(&mut self, frame: &FrameRecord) -> facecluster::Result<Vec<Detection>> {
        Ok(frame
            .faces
            .iter()
            .map(|f| Detection {
                bbox: f.bbox,
                embedding: f.embedding.clone(),
            })
            .collect())
    }
}

/// Iterator over the frames of a detections file.
pub struct FrameReader<R> {
    lines: Lines<R>,
    line_no: usize,
    pending: Option<FrameRecord>,
}

impl<R: BufRead> FrameReader<R> {
    /// Reads the optional header. Returns the declared frame rate, if any.
    pub fn new(reader: R) -> anyhow::Result<(Option<f64>, Self)> {
        let mut r = Self {
            lines: reader.lines(),
            line_no: 0,
            pending: None,
        };
        let Some(first) = r.next_line().transpose()? else {
            return Ok((None, r));
        };
        let value: serde_json::Value = serde_json::from_str(&first)
            .with_context(|| format!("line {}: invalid JSON", r.line_no))?;
        if value.get("width").is_none() && value.get("frame_rate").is_some() {
            let header: Header = serde_json::from_value(value)
                .with_context(|| format!("line {}: invalid header", r.line_no))?;
            return Ok((Some(header.frame_rate), r));
        }
        let frame = serde_json::from_value(value)
            .with_context(|| format!("line {}: invalid frame", r.line_no))?;
        r.pending = Some(frame);
        Ok((None, r))
    }

    fn next_line(&mut self) -> Option<std::io::Result<String>> {
        loop {
            let line = match self.lines.next()? {
                Ok(l) => l,
                Err(e) => return Some(Err(e)),
            };
            self.line_no += 1;
            if !line.trim().is_empty() {
                return Some(Ok(line));
            }
        }
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = facecluster::Result<FrameRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(frame) = self.pending.take() {
            return Some(Ok(frame));
        }
        let line = match self.next_line()? {
            Ok(l) => l,
            Err(e) => return Some(Err(e.into())),
        };
        Some(serde_json::from_str(&line).map_err(|e| {
            FaceClusterError::Provider(format!("line {}: {e}", self.line_no))
        }))
    }
}

/// Opens a detections file.
pub fn open(path: &Path) -> anyhow::Result<(Option<f64>, FrameReader<BufReader<File>>)> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    FrameReader::new(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> (Option<f64>, Vec<facecluster::Result<FrameRecord>>) {
        let (rate, reader) = FrameReader::new(input.as_bytes()).unwrap();
        (rate, reader.collect())
    }

    #[test]
    fn reads_header_and_frames() {
        let input = r#"{"frame_rate": 25.0}
{"width": 640, "height": 480, "faces": [{"box": [10, 60, 50, 20], "embedding": [0.1, 0.2]}]}

{"width": 640, "height": 480}
"#;
        let (rate, frames) = read(input);
        assert_eq!(rate, Some(25.0));
        assert_eq!(frames.len(), 2);
        let first = frames[0].as_ref().unwrap();
        assert_eq!(first.faces.len(), 1);
        assert_eq!(first.faces[0].bbox, Some(FaceBox::from([10, 60, 50, 20])));
        assert!(frames[1].as_ref().unwrap().faces.is_empty());
    }

    #[test]
    fn header_is_optional() {
        let (rate, frames) = read("{\"width\": 2, \"height\": 2, \"faces\": []}\n");
        assert_eq!(rate, None);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn empty_input() {
        let (rate, frames) = read("");
        assert_eq!(rate, None);
        assert!(frames.is_empty());
    }

    #[test]
    fn bad_line_reports_line_number() {
        let (_, frames) = read("{\"frame_rate\": 30}\n{\"width\": 1, \"height\": 1}\nnope\n");
        let err = frames[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("line 3"), "got {err}");
    }

    #[test]
    fn provider_returns_stored_faces() {
        let frame = FrameRecord {
            width: 10,
            height: 10,
            faces: vec![FaceRecord {
                bbox: None,
                embedding: vec![1.0, 2.0],
            }],
        };
        let dets = ReplayProvider.detect(&frame).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].embedding, vec![1.0, 2.0]);
        assert!(dets[0].bbox.is_none());
    }
}
