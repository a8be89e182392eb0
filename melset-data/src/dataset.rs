//! Speech dataset producing Whisper training examples.

use crate::audio::to_mono;
use crate::error::{AudioError, DatasetError, Result};
use crate::preprocessor::WhisperPreprocessor;
use crate::traits::{AudioPreprocessor, Corpus, TextTokenizer};
use crate::types::{CorpusEntry, Example};
use ndarray::Array2;

/// Default number of corpus entries materialized into memory
const DEFAULT_LIMIT: usize = 100;

/// Dataset construction options.
#[derive(clap::Args, Clone, Copy, Debug)]
pub struct DatasetConfig {
    /// Number of corpus entries loaded into memory
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

/// In-memory subset of a corpus turned into training examples on access.
///
/// Entries are read once at construction; features and token sequences are
/// recomputed on every [`SpeechDataset::get`].
pub struct SpeechDataset<T, P = WhisperPreprocessor> {
    entries: Vec<CorpusEntry>,
    tokenizer: T,
    preprocessor: P,
}

impl<T, P> SpeechDataset<T, P>
where
    T: TextTokenizer,
    P: AudioPreprocessor,
{
    /// Materialize the first `config.limit` entries of `corpus`.
    pub fn from_corpus<C>(
        corpus: &C,
        tokenizer: T,
        preprocessor: P,
        config: DatasetConfig,
    ) -> Result<Self>
    where
        C: Corpus + ?Sized,
    {
        let count = config.limit.min(corpus.len());

        tracing::info!(count, available = corpus.len(), "loading corpus entries");

        let entries = (0..count)
            .map(|index| corpus.entry(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_entries(entries, tokenizer, preprocessor))
    }

    /// Use already materialized entries as-is.
    pub fn from_entries(
        entries: Vec<CorpusEntry>,
        tokenizer: T,
        preprocessor: P,
    ) -> Self {
        Self {
            entries,
            tokenizer,
            preprocessor,
        }
    }

    /// Number of materialized entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    pub fn preprocessor(&self) -> &P {
        &self.preprocessor
    }

    /// Build the training example at `index`.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::IndexOutOfRange`] when `index >= len()`
    /// - [`AudioError::InvalidSampleRate`] when the entry was recorded at a
    ///   different rate than the preprocessor computes features for
    pub fn get(&self, index: usize) -> Result<Example> {
        let entry = self.entry(index)?;
        let (input_features, trimmed_samples) = self.features(index, entry)?;

        let mut decoder_input_ids = self.tokenizer.sot_sequence_including_notimestamps().to_vec();
        decoder_input_ids.extend(self.tokenizer.encode(&entry.transcript)?);

        let labels = decoder_input_ids
            .iter()
            .skip(1)
            .copied()
            .chain([self.tokenizer.eot()])
            .collect();

        Ok(Example {
            input_features,
            decoder_input_ids,
            labels,
            trimmed_samples,
        })
    }

    /// Features and reference transcript for evaluation.
    pub fn get_transcript(&self, index: usize) -> Result<(Array2<f32>, String)> {
        let entry = self.entry(index)?;
        let (features, _) = self.features(index, entry)?;
        Ok((features, entry.transcript.clone()))
    }

    fn entry(&self, index: usize) -> Result<&CorpusEntry> {
        self.entries.get(index).ok_or_else(|| {
            DatasetError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            }
            .into()
        })
    }

    fn features(&self, index: usize, entry: &CorpusEntry) -> Result<(Array2<f32>, usize)> {
        let expected = self.preprocessor.sample_rate();
        if entry.sample_rate != expected {
            return Err(AudioError::InvalidSampleRate {
                expected,
                got: entry.sample_rate,
            }
            .into());
        }

        let audio = to_mono(&entry.waveform)?;
        let clip = self.preprocessor.pad_or_trim(&audio);

        if clip.trimmed > 0 {
            tracing::debug!(
                index,
                trimmed = clip.trimmed,
                kept = clip.samples.len(),
                "utterance truncated to clip length"
            );
        }

        let features = self.preprocessor.log_mel_spectrogram(&clip.samples);
        Ok((features, clip.trimmed))
    }
}
