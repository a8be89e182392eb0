//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use eyre::Result;
use melset_data::tokenizer::Task;
use melset_dl::librispeech::Split;
use std::path::PathBuf;

/// Default Hugging Face model providing `tokenizer.json`
pub const DEFAULT_MODEL_ID: &str = "openai/whisper-tiny";

#[derive(Debug, Parser)]
#[command(name = "melset")]
#[command(about = "LibriSpeech to Whisper training batches")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download and index a LibriSpeech split
    Fetch(crate::fetch::Args),

    /// Build the dataset and preview collated batches
    Batches(crate::batches::Args),
}

/// Corpus location shared by all subcommands.
#[derive(clap::Args, Debug)]
pub struct CorpusArgs {
    /// Directory holding the downloaded archives and `LibriSpeech/`
    #[arg(long, default_value = "./data")]
    pub root: PathBuf,

    /// LibriSpeech subset
    #[arg(long, value_enum, default_value_t = Split::TestClean)]
    pub split: Split,
}

/// Where to look up the model repository.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelSource {
    /// Local directory if it holds `tokenizer.json`, otherwise the Hugging Face API
    #[default]
    Auto,
    /// Local directory
    Path,
    /// Hugging Face cache only
    Cache,
    /// Hugging Face API (downloads on demand)
    Api,
}

/// Model repository selection.
#[derive(clap::Args, Debug)]
pub struct ModelArgs {
    /// Model id or local directory containing `tokenizer.json`
    #[arg(long = "model", default_value = DEFAULT_MODEL_ID)]
    pub model_id: String,

    #[arg(long, value_enum, default_value_t = ModelSource::Auto)]
    pub model_source: ModelSource,
}

/// Start-of-transcript sequence options.
#[derive(clap::Args, Debug)]
pub struct TokenizerArgs {
    /// Language token inserted after start-of-transcript
    #[arg(long, default_value = "en")]
    pub language: String,

    #[arg(long, value_enum, default_value_t = Task::Transcribe)]
    pub task: Task,

    /// Checkpoint is English-only (`*.en`): no language or task tokens
    #[arg(long)]
    pub english_only: bool,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Fetch(args) => crate::fetch::execute(args.try_into()?),
        Commands::Batches(args) => crate::batches::execute(args.try_into()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetch_defaults() {
        let cli = Cli::parse_from(["melset", "fetch"]);

        match &cli.command {
            Commands::Fetch(crate::fetch::Args {
                corpus: CorpusArgs { root, split },
            }) if root.to_str() == Some("./data") => {
                assert_eq!(*split, Split::TestClean);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_fetch_split() {
        let cli = Cli::parse_from([
            "melset",
            "fetch",
            "--root",
            "/tmp/corpora",
            "--split",
            "train-clean-100",
        ]);

        match &cli.command {
            Commands::Fetch(crate::fetch::Args {
                corpus: CorpusArgs { root, split },
            }) if root.to_str() == Some("/tmp/corpora") => {
                assert_eq!(*split, Split::TrainClean100);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_batches_defaults() {
        let cli = Cli::parse_from(["melset", "batches"]);

        let Commands::Batches(args) = &cli.command else {
            panic!("unexpected command: {:?}", cli.command);
        };

        assert_eq!(args.dataset.limit, 100);
        assert!((args.clip.duration - 30.0).abs() < 0.001);
        assert_eq!(args.batch_size, 1);
        assert_eq!(args.max_batches, 1);
        assert_eq!(args.mels, 80);
        assert_eq!(args.model.model_id, DEFAULT_MODEL_ID);
        assert_eq!(args.model.model_source, ModelSource::Auto);
        assert_eq!(args.tokenizer.language, "en");
        assert_eq!(args.tokenizer.task, Task::Transcribe);
        assert!(!args.tokenizer.english_only);
    }

    #[test]
    fn parses_batches_options() {
        let cli = Cli::parse_from([
            "melset",
            "batches",
            "--split",
            "dev-other",
            "--limit",
            "8",
            "--batch-size",
            "4",
            "--max-batches",
            "2",
            "--model",
            "openai/whisper-large-v3",
            "--model-source",
            "cache",
            "--language",
            "fr",
            "--task",
            "translate",
            "--mels",
            "128",
        ]);

        let Commands::Batches(args) = &cli.command else {
            panic!("unexpected command: {:?}", cli.command);
        };

        assert_eq!(args.corpus.split, Split::DevOther);
        assert_eq!(args.dataset.limit, 8);
        assert_eq!(args.batch_size, 4);
        assert_eq!(args.max_batches, 2);
        assert_eq!(args.mels, 128);
        assert_eq!(args.model.model_id, "openai/whisper-large-v3");
        assert_eq!(args.model.model_source, ModelSource::Cache);
        assert_eq!(args.tokenizer.language, "fr");
        assert_eq!(args.tokenizer.task, Task::Translate);
    }

    #[test]
    fn sample_rate_is_not_configurable() {
        let result = Cli::try_parse_from(["melset", "batches", "--sample-rate", "8000"]);

        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_split() {
        let result = Cli::try_parse_from(["melset", "fetch", "--split", "train-clean"]);

        assert!(result.is_err());
    }
}
