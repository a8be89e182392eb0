//! Core traits for the data pipeline collaborators.
//!
//! The dataset only talks to its corpus, tokenizer and feature extractor
//! through these traits, so any implementation honoring the contracts below
//! can be substituted.

use crate::audio::Trimmed;
use crate::error::Result;
use crate::types::CorpusEntry;
use ndarray::Array2;

/// Random-access labeled speech corpus.
pub trait Corpus {
    /// Number of utterances available.
    fn len(&self) -> usize;

    /// Whether the corpus has no utterances.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the utterance at `index`.
    ///
    /// Callers only pass indices below [`Corpus::len`].
    fn entry(&self, index: usize) -> Result<CorpusEntry>;
}

impl Corpus for Vec<CorpusEntry> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn entry(&self, index: usize) -> Result<CorpusEntry> {
        use crate::error::DatasetError;

        self.get(index).cloned().ok_or_else(|| {
            DatasetError::IndexOutOfRange {
                index,
                len: self.as_slice().len(),
            }
            .into()
        })
    }
}

/// Converts mono audio into fixed-shape model features.
pub trait AudioPreprocessor {
    /// Sample rate features are computed for; input is never resampled.
    fn sample_rate(&self) -> u32;

    /// Sample count every clip is padded or trimmed to.
    fn n_samples(&self) -> usize;

    /// Shape `(n_mels, n_frames)` of every feature this preprocessor emits.
    fn feature_shape(&self) -> (usize, usize);

    /// Truncate or zero-pad to [`AudioPreprocessor::n_samples`].
    fn pad_or_trim(&self, audio: &[f32]) -> Trimmed {
        crate::audio::pad_or_trim(audio, self.n_samples())
    }

    /// Extract the log-mel feature of a fixed-length clip.
    fn log_mel_spectrogram(&self, audio: &[f32]) -> Array2<f32>;
}

/// Model vocabulary used to build decoder inputs and labels.
pub trait TextTokenizer {
    /// Encode transcript text without adding special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Start-of-transcript marker sequence, ending with the no-timestamps token.
    fn sot_sequence_including_notimestamps(&self) -> &[u32];

    /// End-of-transcript token id.
    fn eot(&self) -> u32;
}
