//! Configuration types for resolved CLI arguments.
//!
//! Shared Config structs and their TryFrom implementations.
//! Args structs (for CLI parsing) remain in cli.rs.

use crate::cli::{CorpusArgs, ModelArgs, ModelSource, TokenizerArgs};
use color_eyre::Section;
use eyre::{Result, eyre};
use hf_hub::Cache;
use hf_hub::api::sync::Api;
use melset_data::audio::MelSpectrogram;
use melset_data::tokenizer::TokenizerConfig;
use melset_data::types::{TOKENIZER_FILE, TokenizerSource};
use melset_dl::librispeech::Split;
use std::path::{Path, PathBuf};

/// Resolved corpus location.
#[derive(Debug)]
pub struct CorpusConfig {
    pub root: PathBuf,
    pub split: Split,
}

impl From<CorpusArgs> for CorpusConfig {
    fn from(args: CorpusArgs) -> Self {
        Self {
            root: args.root,
            split: args.split,
        }
    }
}

/// Resolved model configuration.
#[derive(Debug)]
pub struct ModelConfig {
    pub tokenizer: TokenizerSource,
}

impl TryFrom<ModelArgs> for ModelConfig {
    type Error = eyre::Error;

    fn try_from(args: ModelArgs) -> Result<Self> {
        let tokenizer = args.model_source.tokenizer_source(args.model_id)?;

        Ok(Self { tokenizer })
    }
}

impl ModelSource {
    /// Pick where `model_id`'s `tokenizer.json` is read from.
    ///
    /// `Auto` reads a local checkpoint when `model_id` is a directory that
    /// holds the tokenizer and falls back to the Hub otherwise.
    fn tokenizer_source(self, model_id: String) -> Result<TokenizerSource> {
        let local = Path::new(&model_id).join(TOKENIZER_FILE).is_file();

        let source = match (self, local) {
            (ModelSource::Path, _) | (ModelSource::Auto, true) => {
                TokenizerSource::Dir(PathBuf::from(model_id))
            }
            (ModelSource::Cache, _) => TokenizerSource::Cache(Cache::from_env().model(model_id)),
            (ModelSource::Api, _) | (ModelSource::Auto, false) => {
                TokenizerSource::Hub(Api::new()?.model(model_id))
            }
        };

        Ok(source)
    }
}

impl From<TokenizerArgs> for TokenizerConfig {
    fn from(args: TokenizerArgs) -> Self {
        Self {
            multilingual: !args.english_only,
            language: args.language,
            task: args.task,
        }
    }
}

/// Map a mel bin count to its Whisper front end.
pub fn mel_spectrogram(n_mels: usize) -> Result<MelSpectrogram> {
    match n_mels {
        80 => Ok(MelSpectrogram::WHISPER),
        128 => Ok(MelSpectrogram::WHISPER_V3),
        n => Err(eyre!("unsupported mel bin count: {n}"))
            .suggestion("use --mels 80, or --mels 128 for large-v3 checkpoints"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use melset_data::tokenizer::Task;

    #[test]
    fn maps_mel_bins() {
        assert_eq!(mel_spectrogram(80).unwrap(), MelSpectrogram::WHISPER);
        assert_eq!(mel_spectrogram(128).unwrap(), MelSpectrogram::WHISPER_V3);
        assert!(mel_spectrogram(64).is_err());
    }

    #[test]
    fn english_only_drops_multilingual() {
        let config: TokenizerConfig = TokenizerArgs {
            language: "en".to_string(),
            task: Task::Transcribe,
            english_only: true,
        }
        .into();

        assert_eq!(config, TokenizerConfig::english_only());
    }

    #[test]
    fn path_source_keeps_directory() {
        let config = ModelConfig::try_from(ModelArgs {
            model_id: "./models/whisper-tiny".to_string(),
            model_source: ModelSource::Path,
        })
        .unwrap();

        assert!(matches!(
            config.tokenizer,
            TokenizerSource::Dir(path) if path.ends_with("models/whisper-tiny")
        ));
    }

    #[test]
    fn auto_source_prefers_local_checkpoint() {
        let dir = std::env::temp_dir().join("melset_auto_model");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(TOKENIZER_FILE), "{}").unwrap();

        let source = ModelSource::Auto
            .tokenizer_source(dir.to_string_lossy().into_owned())
            .unwrap();

        assert!(matches!(source, TokenizerSource::Dir(path) if path == dir));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn cache_source_stays_offline() {
        let source = ModelSource::Cache
            .tokenizer_source("openai/whisper-tiny".to_string())
            .unwrap();

        assert!(matches!(source, TokenizerSource::Cache(_)));
    }
}
