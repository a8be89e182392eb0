//! Whisper tokenizer built on a Hugging Face `tokenizer.json`.

use crate::error::{ConfigError, Error, Result};
use crate::traits::TextTokenizer;
use std::path::Path;
use tokenizers::Tokenizer;

const SOT: &str = "<|startoftranscript|>";
const EOT: &str = "<|endoftext|>";
const NO_TIMESTAMPS: &str = "<|notimestamps|>";

/// Task token emitted after the language token.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Task {
    #[default]
    Transcribe,
    Translate,
}

impl Task {
    fn token(self) -> &'static str {
        match self {
            Task::Transcribe => "<|transcribe|>",
            Task::Translate => "<|translate|>",
        }
    }
}

/// How the start-of-transcript sequence is assembled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Multilingual vocabularies carry language and task tokens
    pub multilingual: bool,
    /// Language code, e.g. `en`
    pub language: String,
    pub task: Task,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            multilingual: true,
            language: "en".to_string(),
            task: Task::Transcribe,
        }
    }
}

impl TokenizerConfig {
    /// Configuration for English-only checkpoints (`*.en`).
    pub fn english_only() -> Self {
        Self {
            multilingual: false,
            ..Self::default()
        }
    }

    fn sot_tokens(&self) -> Vec<String> {
        let mut tokens = vec![SOT.to_string()];
        if self.multilingual {
            tokens.push(format!("<|{}|>", self.language));
            tokens.push(self.task.token().to_string());
        }
        tokens.push(NO_TIMESTAMPS.to_string());
        tokens
    }
}

/// Tokenizer for Whisper decoder inputs and labels.
pub struct WhisperTokenizer {
    pub tokenizer: Tokenizer,
    sot_sequence: Vec<u32>,
    eot: u32,
}

impl WhisperTokenizer {
    /// Wrap a loaded tokenizer, resolving the special token ids.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSpecialToken`] when the vocabulary lacks
    /// a required marker token.
    pub fn new(tokenizer: Tokenizer, config: &TokenizerConfig) -> Result<Self> {
        let sot_sequence = config
            .sot_tokens()
            .iter()
            .map(|token| special_token_id(&tokenizer, token))
            .collect::<Result<Vec<_>>>()?;

        let eot = special_token_id(&tokenizer, EOT)?;

        tracing::debug!(?sot_sequence, eot, "resolved special tokens");

        Ok(Self {
            tokenizer,
            sot_sequence,
            eot,
        })
    }

    /// Load from a `tokenizer.json` file.
    pub fn from_file(path: impl AsRef<Path>, config: &TokenizerConfig) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path)?;
        Self::new(tokenizer, config)
    }

    /// Get vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    /// Decode token ids to text.
    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        self.tokenizer
            .decode(ids, skip_special_tokens)
            .map_err(Error::Tokenizers)
    }
}

fn special_token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| ConfigError::MissingSpecialToken(token.to_string()).into())
}

impl TextTokenizer for WhisperTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self.tokenizer.encode(text, false)?;
        Ok(encoding.get_ids().to_vec())
    }

    fn sot_sequence_including_notimestamps(&self) -> &[u32] {
        &self.sot_sequence
    }

    fn eot(&self) -> u32 {
        self.eot
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    const TOKENIZER_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": 3, "content": "<|endoftext|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 4, "content": "<|startoftranscript|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 5, "content": "<|en|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 6, "content": "<|transcribe|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 7, "content": "<|translate|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 8, "content": "<|notimestamps|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"[UNK]": 0, "HELLO": 1, "WORLD": 2},
            "unk_token": "[UNK]"
        }
    }"#;

    /// Word-level vocabulary with the Whisper special tokens appended.
    pub(crate) fn word_level_tokenizer() -> Tokenizer {
        Tokenizer::from_bytes(TOKENIZER_JSON).unwrap()
    }

    #[test]
    fn multilingual_sot_sequence() {
        let tokenizer =
            WhisperTokenizer::new(word_level_tokenizer(), &TokenizerConfig::default()).unwrap();

        // special tokens follow the 3-word vocabulary: eot=3, sot=4, en=5, ...
        assert_eq!(tokenizer.eot(), 3);
        assert_eq!(tokenizer.sot_sequence_including_notimestamps(), &[4, 5, 6, 8]);
    }

    #[test]
    fn translate_task_token() {
        let config = TokenizerConfig {
            task: Task::Translate,
            ..TokenizerConfig::default()
        };
        let tokenizer = WhisperTokenizer::new(word_level_tokenizer(), &config).unwrap();

        assert_eq!(tokenizer.sot_sequence_including_notimestamps(), &[4, 5, 7, 8]);
    }

    #[test]
    fn english_only_sot_sequence() {
        let tokenizer =
            WhisperTokenizer::new(word_level_tokenizer(), &TokenizerConfig::english_only())
                .unwrap();

        assert_eq!(tokenizer.sot_sequence_including_notimestamps(), &[4, 8]);
    }

    #[test]
    fn missing_language_token() {
        let config = TokenizerConfig {
            language: "xx".to_string(),
            ..TokenizerConfig::default()
        };

        let result = WhisperTokenizer::new(word_level_tokenizer(), &config);

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingSpecialToken(token))) if token == "<|xx|>"
        ));
    }

    #[test]
    fn encodes_without_special_tokens() {
        let tokenizer =
            WhisperTokenizer::new(word_level_tokenizer(), &TokenizerConfig::default()).unwrap();

        assert_eq!(tokenizer.encode("HELLO WORLD").unwrap(), vec![1, 2]);
        assert_eq!(tokenizer.decode(&[4, 1, 2, 3], true).unwrap(), "HELLO WORLD");
    }
}
