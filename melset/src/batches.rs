//! Batches subcommand - build the dataset and preview collated batches.

use crate::cli::{CorpusArgs, ModelArgs, TokenizerArgs};
use crate::config::{CorpusConfig, ModelConfig, mel_spectrogram};
use color_eyre::Section;
use eyre::{Context, Result};
use melset_data::clip::ClipConfig;
use melset_data::collate::unmask_labels;
use melset_data::dataset::{DatasetConfig, SpeechDataset};
use melset_data::loader::DataLoader;
use melset_data::preprocessor::WhisperPreprocessor;
use melset_data::tokenizer::{TokenizerConfig, WhisperTokenizer};
use melset_data::traits::{AudioPreprocessor, TextTokenizer};
use melset_data::types::Batch;
use melset_dl::librispeech::download_and_open;
use std::time::Instant;

/// CLI arguments for batch preview.
#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub dataset: DatasetConfig,

    #[command(flatten)]
    pub clip: ClipConfig,

    /// Examples per batch
    #[arg(long, default_value_t = 1)]
    pub batch_size: usize,

    /// Stop after this many batches
    #[arg(long, default_value_t = 1)]
    pub max_batches: usize,

    /// Mel bins: 80, or 128 for large-v3
    #[arg(long, default_value_t = 80)]
    pub mels: usize,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub tokenizer: TokenizerArgs,
}

/// Resolved configuration for batch preview.
#[derive(Debug)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub dataset: DatasetConfig,
    pub preprocessor: WhisperPreprocessor,
    pub tokenizer: TokenizerConfig,
    pub model: ModelConfig,
    pub batch_size: usize,
    pub max_batches: usize,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        args.clip.validate()?;
        let mel = mel_spectrogram(args.mels)?;

        Ok(Self {
            corpus: args.corpus.into(),
            dataset: args.dataset,
            preprocessor: WhisperPreprocessor::new(mel, args.clip),
            tokenizer: args.tokenizer.into(),
            model: args.model.try_into()?,
            batch_size: args.batch_size,
            max_batches: args.max_batches,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let CorpusConfig { root, split } = config.corpus;

    let corpus = download_and_open(&root, split)
        .wrap_err_with(|| format!("failed to open {split}"))
        .with_suggestion(|| format!("melset fetch --root {:?} --split {split}", root.display()))?;

    let tokenizer = load_tokenizer(&config.model, &config.tokenizer)?;

    let s = Instant::now();

    let dataset =
        SpeechDataset::from_corpus(&corpus, tokenizer, config.preprocessor, config.dataset)
            .wrap_err("failed to build dataset")?;

    tracing::info!(
        examples = dataset.len(),
        features = ?dataset.preprocessor().feature_shape(),
        duration = %format_secs(s.elapsed().as_secs_f32()),
        "dataset ready"
    );

    let loader = DataLoader::new(&dataset, config.batch_size)?;

    tracing::info!(
        batches = loader.num_batches(),
        max_batches = config.max_batches,
        "iterating batches"
    );

    for (index, batch) in loader.take(config.max_batches).enumerate() {
        let batch = batch.wrap_err_with(|| format!("failed to load batch {index}"))?;

        tracing::info!(
            index,
            input_features = ?batch.input_features.shape(),
            labels = ?batch.labels.dim(),
            decoder_input_ids = ?batch.decoder_input_ids.dim(),
            "batch"
        );

        print_batch(index, &batch, dataset.tokenizer())?;
    }

    Ok(())
}

fn load_tokenizer(model: &ModelConfig, config: &TokenizerConfig) -> Result<WhisperTokenizer> {
    tracing::info!(source = ?model.tokenizer, "locating tokenizer");

    let tokenizer = model
        .tokenizer
        .load(config)
        .with_suggestion(|| "pass --english-only for *.en checkpoints")?;

    tracing::debug!(vocab_size = tokenizer.vocab_size(), "tokenizer loaded");

    Ok(tokenizer)
}

/// Print each row's labels and decoder inputs as text.
///
/// Label padding is shown as end-of-transcript.
fn print_batch(index: usize, batch: &Batch, tokenizer: &WhisperTokenizer) -> Result<()> {
    let eot = tokenizer.eot();

    println!("batch {index} ({} examples, width {})", batch.len(), batch.max_len());

    let rows = batch.labels.rows().into_iter().zip(batch.decoder_input_ids.rows());
    for (row, (labels, decoder_input_ids)) in rows.enumerate() {
        let labels = tokenizer.decode(&unmask_labels(&labels.to_vec(), eot), false)?;
        let decoder_input_ids =
            tokenizer.decode(&unmask_labels(&decoder_input_ids.to_vec(), eot), false)?;

        println!("  [{row}] labels:            {labels}");
        println!("  [{row}] decoder_input_ids: {decoder_input_ids}");
    }

    Ok(())
}

/// Format seconds as a string with two decimal places.
fn format_secs(secs: f32) -> String {
    format!("{:.2}s", secs)
}
