use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SubtitleError>;

#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("I/O error while {context} ({}): {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context} ({}): {source}", .path.display())]
    Json {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed caption block #{block} at line {line:?}: {reason}")]
    MalformedBlock {
        block: usize,
        line: String,
        reason: String,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<SubtitleError>,
    },
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: &'static str },
    #[error("reference corpus unavailable ({}): {reason}", .path.display())]
    CorpusUnavailable { path: PathBuf, reason: String },
}

impl SubtitleError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            context,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(block: usize, line: &str, reason: impl std::fmt::Display) -> Self {
        Self::MalformedBlock {
            block,
            line: line.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: SubtitleError) -> Self {
        Self::Parse {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn timestamp(value: &str, reason: &'static str) -> Self {
        Self::InvalidTimestamp {
            value: value.to_string(),
            reason,
        }
    }
}
