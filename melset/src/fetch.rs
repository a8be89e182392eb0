//! Fetch subcommand - download and index a LibriSpeech split.

use crate::cli::CorpusArgs;
use crate::config::CorpusConfig;
use color_eyre::Section;
use eyre::{Context, Result};
use melset_data::traits::Corpus;
use melset_dl::librispeech::download_and_open;

/// CLI arguments for fetching a split.
#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,
}

/// Resolved configuration for fetching a split.
#[derive(Debug)]
pub struct Config {
    pub corpus: CorpusConfig,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            corpus: args.corpus.into(),
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let CorpusConfig { root, split } = config.corpus;

    tracing::info!(root = ?root.display(), %split, "fetching split");

    let corpus = download_and_open(&root, split)
        .wrap_err_with(|| format!("failed to fetch {split}"))
        .with_note(|| format!("archives are stored under {:?}", root.display()))?;

    tracing::info!(utterances = corpus.len(), path = ?corpus.path().display(), "split ready");

    println!(
        "{split}: {} utterances in {}",
        corpus.len(),
        corpus.path().display()
    );

    Ok(())
}
