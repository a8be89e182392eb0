//! LibriSpeech corpus store for melset.
//!
//! ## Modules
//!
//! - [`dl`] - Archive download and extraction
//! - [`librispeech`] - Split indexing and [`melset_data::traits::Corpus`] access
//!
//! ## Quick Start
//!
//! ```no_run
//! use melset_data::traits::Corpus;
//! use melset_dl::librispeech::{Split, download_and_open};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let corpus = download_and_open(Path::new("./data"), Split::TestClean)?;
//! let entry = corpus.entry(0)?;
//! println!("{}: {}", entry.utterance_id, entry.transcript);
//! # Ok(())
//! # }
//! ```

pub mod dl;
pub mod error;
pub mod librispeech;
