//! Error types for melset-dl.

use std::path::PathBuf;
use thiserror::Error;

/// Corpus download and indexing errors.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request or transfer failed
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// IO error while writing, extracting or scanning files
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Split directory absent after download and extraction
    #[error("split directory not found: {path:?}")]
    MissingSplit { path: PathBuf },

    /// Transcript line not of the form `<speaker>-<chapter>-<utterance> TEXT`
    #[error("malformed transcript line {line} in {path:?}: {content:?}")]
    MalformedTranscript {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// Transcript entry without a sibling audio file
    #[error("no audio file for utterance {id} in {dir:?}")]
    MissingAudio { id: String, dir: PathBuf },
}

/// Result type alias for melset-dl operations.
pub type Result<T> = std::result::Result<T, Error>;
