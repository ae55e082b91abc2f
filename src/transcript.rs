//! Boundary with the speech-to-text side.
//!
//! Transcription happens elsewhere; this module only takes its finished output
//! and turns it into a raw caption file the pipeline can process.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubtitleError};
use crate::srt::write_srt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Producer of a finalized, start-ordered transcript.
pub trait TranscriptSource {
    fn segments(&self) -> Result<Vec<TranscriptSegment>>;
}

/// Transcript stored as `{"segments": [{"start", "end", "text"}, ...]}`.
#[derive(Debug, Clone)]
pub struct JsonTranscript {
    path: PathBuf,
}

impl JsonTranscript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Deserialize)]
struct TranscriptFile {
    segments: Vec<TranscriptSegment>,
}

impl TranscriptSource for JsonTranscript {
    fn segments(&self) -> Result<Vec<TranscriptSegment>> {
        let data = fs::read_to_string(&self.path)
            .map_err(|e| SubtitleError::io("reading transcript", &self.path, e))?;
        let file: TranscriptFile = serde_json::from_str(&data)
            .map_err(|e| SubtitleError::json("parsing transcript", &self.path, e))?;
        let mut segments = file.segments;
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Ok(segments)
    }
}

/// Raw caption file for transcript segments, text trimmed, numbered from 1.
pub fn segments_to_srt(segments: &[TranscriptSegment]) -> String {
    write_srt(segments.iter().map(|s| (s.start, s.end, s.text.trim())))
}

/// Load state of an external speech model, for callers that poll it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Pollable model-loading state: status plus a percentage that never goes back.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelProgress {
    status: ModelStatus,
    percent: u8,
    message: String,
}

impl ModelProgress {
    pub fn status(&self) -> ModelStatus {
        self.status
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn start(&mut self, message: impl Into<String>) {
        self.status = ModelStatus::Loading;
        self.message = message.into();
    }

    /// Raises the percentage; lower values are ignored, values over 100 clamp.
    pub fn advance(&mut self, percent: u8, message: impl Into<String>) {
        self.percent = self.percent.max(percent.min(100));
        self.message = message.into();
    }

    pub fn finish(&mut self, message: impl Into<String>) {
        self.status = ModelStatus::Loaded;
        self.percent = 100;
        self.message = message.into();
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ModelStatus::Error;
        self.message = message.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srt::parse_srt;

    #[test]
    fn raw_srt_from_segments() {
        let segments = vec![
            TranscriptSegment {
                start: 0.0,
                end: 2.0,
                text: "  بسم الله ".into(),
            },
            TranscriptSegment {
                start: 2.5,
                end: 4.0,
                text: "الحمد لله".into(),
            },
        ];
        let srt = segments_to_srt(&segments);
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,000\nبسم الله\n\n2\n"));
        let parsed = parse_srt(&srt).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].text, "الحمد لله");
    }

    #[test]
    fn progress_is_monotonic() {
        let mut p = ModelProgress::default();
        assert_eq!(p.status(), ModelStatus::Idle);
        p.start("loading");
        p.advance(40, "weights");
        p.advance(20, "stale update");
        assert_eq!(p.percent(), 40);
        assert_eq!(p.message(), "stale update");
        p.advance(250, "done");
        assert_eq!(p.percent(), 100);
        p.finish("ready");
        assert_eq!(p.status(), ModelStatus::Loaded);
    }

    #[test]
    fn failure_keeps_progress() {
        let mut p = ModelProgress::default();
        p.start("loading");
        p.advance(30, "x");
        p.fail("out of memory");
        assert_eq!(p.status(), ModelStatus::Error);
        assert_eq!(p.percent(), 30);
        assert_eq!(serde_json::to_value(p.status()).unwrap(), "error");
    }
}
