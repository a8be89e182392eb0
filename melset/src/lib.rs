//! melset: LibriSpeech to Whisper training batches.
//!
//! Subcommands:
//!
//! - `fetch` - download and index a LibriSpeech split
//! - `batches` - build the dataset and preview collated batches

pub mod batches;
pub mod cli;
pub mod config;
pub mod fetch;
