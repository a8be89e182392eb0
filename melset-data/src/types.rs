//! Core types for melset-data

use crate::tokenizer::{TokenizerConfig, WhisperTokenizer};
use eyre::{ContextCompat, Result, WrapErr, ensure};
use hf_hub::CacheRepo;
use hf_hub::api::sync::ApiRepo;
use ndarray::{Array2, Array3};
use std::path::PathBuf;

/// One labeled utterance as read from a corpus.
#[derive(Clone, Debug)]
pub struct CorpusEntry {
    /// Audio samples `(channels, samples)` in [-1, 1]
    pub waveform: Array2<f32>,
    /// Sample rate of `waveform` in Hz
    pub sample_rate: u32,
    /// Reference transcript
    pub transcript: String,
    pub speaker_id: u32,
    pub chapter_id: u32,
    pub utterance_id: u32,
}

/// Training example produced by the dataset.
#[derive(Clone, Debug)]
pub struct Example {
    /// Log-mel features `(n_mels, n_frames)`
    pub input_features: Array2<f32>,
    /// Start-of-transcript sequence followed by the encoded transcript
    pub decoder_input_ids: Vec<u32>,
    /// `decoder_input_ids` shifted left by one with end-of-transcript appended
    pub labels: Vec<u32>,
    /// Trailing audio samples dropped to fit the clip length
    pub trimmed_samples: usize,
}

/// Collated batch ready for a sequence-to-sequence model.
#[derive(Clone, Debug)]
pub struct Batch {
    /// Stacked features `(batch, n_mels, n_frames)`
    pub input_features: Array3<f32>,
    /// Labels padded with [`crate::collate::IGNORE_INDEX`] `(batch, max_len)`
    pub labels: Array2<i64>,
    /// Decoder inputs padded with the end-of-transcript id `(batch, max_len)`
    pub decoder_input_ids: Array2<i64>,
}

impl Batch {
    /// Number of examples in the batch.
    pub fn len(&self) -> usize {
        self.input_features.shape()[0]
    }

    /// Whether the batch holds no examples (never true for collated batches).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared padded width of `labels` and `decoder_input_ids`.
    pub fn max_len(&self) -> usize {
        self.labels.ncols()
    }
}

/// File every Whisper checkpoint ships its vocabulary in
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Where a checkpoint's `tokenizer.json` is read from.
#[derive(Debug)]
pub enum TokenizerSource {
    /// Local checkpoint directory
    Dir(PathBuf),
    /// Hugging Face cache only; never touches the network
    Cache(CacheRepo),
    /// Hugging Face Hub; downloads into the cache on first use
    Hub(ApiRepo),
}

impl TokenizerSource {
    /// Locate `tokenizer.json`, downloading it for [`TokenizerSource::Hub`].
    pub fn path(&self) -> Result<PathBuf> {
        let path = match self {
            TokenizerSource::Dir(dir) => {
                let path = dir.join(TOKENIZER_FILE);
                ensure!(
                    path.is_file(),
                    "no {TOKENIZER_FILE} in checkpoint directory {:?}",
                    dir.display()
                );
                path
            }
            TokenizerSource::Cache(repo) => repo
                .get(TOKENIZER_FILE)
                .wrap_err(format!("{TOKENIZER_FILE} not found in Hugging Face cache"))?,
            TokenizerSource::Hub(repo) => repo
                .get(TOKENIZER_FILE)
                .wrap_err_with(|| format!("failed to fetch {}", repo.url(TOKENIZER_FILE)))?,
        };

        tracing::debug!(path = ?path.display(), "located tokenizer");

        Ok(path)
    }

    /// Locate and load the tokenizer with the given start-of-transcript options.
    pub fn load(&self, config: &TokenizerConfig) -> Result<WhisperTokenizer> {
        let path = self.path()?;

        WhisperTokenizer::from_file(&path, config)
            .wrap_err_with(|| format!("failed to load tokenizer: {:?}", path.display()))
    }
}
