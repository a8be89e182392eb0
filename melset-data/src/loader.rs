//! Sequential batch iteration over a dataset.

use crate::collate::WhisperCollator;
use crate::dataset::SpeechDataset;
use crate::error::{ConfigError, Result};
use crate::traits::{AudioPreprocessor, TextTokenizer};
use crate::types::Batch;
use std::ops::Range;

/// Iterates a dataset in order, collating `batch_size` examples at a time.
///
/// The last batch holds the remainder when the length is not a multiple of
/// the batch size.
pub struct DataLoader<'a, T, P> {
    dataset: &'a SpeechDataset<T, P>,
    collator: WhisperCollator,
    batch_size: usize,
    position: usize,
}

impl<'a, T, P> DataLoader<'a, T, P>
where
    T: TextTokenizer,
    P: AudioPreprocessor,
{
    /// Create a loader whose collator pads decoder inputs with the dataset
    /// tokenizer's end-of-transcript id.
    pub fn new(dataset: &'a SpeechDataset<T, P>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize.into());
        }

        Ok(Self {
            dataset,
            collator: WhisperCollator::new(dataset.tokenizer().eot()),
            batch_size,
            position: 0,
        })
    }

    /// Number of batches a full pass yields.
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    fn collate_range(&self, range: Range<usize>) -> Result<Batch> {
        let examples = range
            .map(|index| self.dataset.get(index))
            .collect::<Result<Vec<_>>>()?;

        self.collator.collate(&examples)
    }
}

impl<T, P> Iterator for DataLoader<'_, T, P>
where
    T: TextTokenizer,
    P: AudioPreprocessor,
{
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.dataset.len() {
            return None;
        }

        let start = self.position;
        let end = (start + self.batch_size).min(self.dataset.len());
        self.position = end;

        tracing::debug!(start, end, "loading batch");

        Some(self.collate_range(start..end))
    }
}
