//! melset-data: Whisper fine-tuning data pipeline.
//!
//! Turns a labeled speech corpus into training batches for a
//! sequence-to-sequence speech recognition model.
//!
//! # Architecture
//!
//! The dataset is built around three collaborator traits:
//!
//! - [`traits::Corpus`]: Random-access labeled utterances
//! - [`traits::AudioPreprocessor`]: Fixed-length clip to log-mel features
//! - [`traits::TextTokenizer`]: Transcript to token ids with SOT/EOT markers
//!
//! [`dataset::SpeechDataset`] produces one [`types::Example`] per index and
//! [`collate::WhisperCollator`] pads a list of them into a [`types::Batch`].
//!
//! # Quick Start
//!
//! ```ignore
//! use melset_data::dataset::{DatasetConfig, SpeechDataset};
//! use melset_data::loader::DataLoader;
//! use melset_data::preprocessor::WhisperPreprocessor;
//! use melset_data::tokenizer::{TokenizerConfig, WhisperTokenizer};
//!
//! let tokenizer = WhisperTokenizer::from_file("tokenizer.json", &TokenizerConfig::default())?;
//! let dataset = SpeechDataset::from_corpus(
//!     &corpus,
//!     tokenizer,
//!     WhisperPreprocessor::whisper(),
//!     DatasetConfig::default(),
//! )?;
//!
//! for batch in DataLoader::new(&dataset, 16)? {
//!     let batch = batch?;
//!     println!("{:?}", batch.input_features.shape());
//! }
//! ```

pub mod audio;
pub mod clip;
pub mod collate;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod preprocessor;
pub mod tokenizer;
pub mod traits;
pub mod types;
