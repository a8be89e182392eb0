//! Error types for melset-data organized by processing stage.

use ndarray::ShapeError;
use thiserror::Error;

/// Data pipeline error variants organized by processing stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration stage error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Audio loading and validation error
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Example lookup error
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Batch assembly error
    #[error(transparent)]
    Collate(#[from] CollateError),

    /// Tokenizer error
    #[error(transparent)]
    Tokenizers(tokenizers::Error),
}

/// Configuration errors (tokenizer vocabulary, clip length, etc.).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Special token absent from the tokenizer vocabulary
    #[error("special token not found in vocabulary: {0}")]
    MissingSpecialToken(String),

    /// Invalid clip duration
    #[error("invalid clip duration: {0}s")]
    InvalidClipDuration(f32),

    /// Invalid batch size
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}

/// Audio loading and validation errors.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Sample rate does not match the rate the features are computed for
    #[error("invalid sample rate: expected {expected}Hz, got {got}Hz")]
    InvalidSampleRate { expected: u32, got: u32 },

    /// Channel count validation failed
    #[error("invalid channel count: expected at least one channel, got {0}")]
    InvalidChannels(usize),

    /// File extension not handled by any decoder
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// IO error during audio loading
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// WAV file format error
    #[error(transparent)]
    Hound(#[from] hound::Error),

    /// FLAC decoding error
    #[error(transparent)]
    Flac(#[from] claxon::Error),

    /// ndarray shape error while building a waveform
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Example lookup errors.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Index past the materialized entries
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Batch assembly errors.
#[derive(Debug, Error)]
pub enum CollateError {
    /// No examples to collate
    #[error("cannot collate an empty list of examples")]
    EmptyBatch,

    /// Feature shape differs from the first example in the batch
    #[error("feature shape mismatch at example {index}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        index: usize,
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// ndarray shape error while stacking
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Result type alias for melset-data operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// hound::Error → AudioError → Error
impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::Audio(AudioError::Hound(e))
    }
}

// claxon::Error → AudioError → Error
impl From<claxon::Error> for Error {
    fn from(e: claxon::Error) -> Self {
        Error::Audio(AudioError::Flac(e))
    }
}

// std::io::Error → AudioError → Error
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Audio(AudioError::Io(e))
    }
}

// tokenizers::Error → Error
impl From<tokenizers::Error> for Error {
    fn from(e: tokenizers::Error) -> Self {
        Error::Tokenizers(e)
    }
}
