//! Batch collation with label masking.

use crate::error::{CollateError, Result};
use crate::types::{Batch, Example};
use ndarray::{Array2, ArrayView2, Axis};

/// Label value excluded from the loss.
pub const IGNORE_INDEX: i64 = -100;

/// Pads ragged token sequences into rectangular Whisper batches.
///
/// Labels are padded with [`IGNORE_INDEX`]; decoder inputs with the
/// end-of-transcript id. Both share one width per batch.
#[derive(Clone, Copy, Debug)]
pub struct WhisperCollator {
    eot: u32,
}

impl WhisperCollator {
    /// Create a collator padding decoder inputs with `eot`.
    pub fn new(eot: u32) -> Self {
        Self { eot }
    }

    /// Collate examples into one batch.
    ///
    /// # Errors
    ///
    /// - [`CollateError::EmptyBatch`] for an empty slice
    /// - [`CollateError::ShapeMismatch`] when features differ in shape
    pub fn collate(&self, examples: &[Example]) -> Result<Batch> {
        let first = examples.first().ok_or(CollateError::EmptyBatch)?;
        let expected = first.input_features.dim();

        if let Some((index, got)) = examples
            .iter()
            .map(|example| example.input_features.dim())
            .enumerate()
            .find(|&(_, dim)| dim != expected)
        {
            return Err(CollateError::ShapeMismatch {
                index,
                expected,
                got,
            }
            .into());
        }

        let max_len = examples
            .iter()
            .flat_map(|example| [example.labels.len(), example.decoder_input_ids.len()])
            .max()
            .unwrap_or(0);

        let labels = pad_rows(
            examples.iter().map(|example| example.labels.as_slice()),
            max_len,
            IGNORE_INDEX,
        )?;

        let decoder_input_ids = pad_rows(
            examples
                .iter()
                .map(|example| example.decoder_input_ids.as_slice()),
            max_len,
            self.eot as i64,
        )?;

        let features: Vec<ArrayView2<f32>> = examples
            .iter()
            .map(|example| example.input_features.view())
            .collect();
        let input_features = ndarray::stack(Axis(0), &features).map_err(CollateError::Shape)?;

        tracing::trace!(batch = examples.len(), max_len, "collated batch");

        Ok(Batch {
            input_features,
            labels,
            decoder_input_ids,
        })
    }
}

/// Right-pad `tokens` with `value` up to `len`.
///
/// Sequences already at or beyond `len` are returned unchanged.
pub fn pad_right(tokens: &[u32], len: usize, value: i64) -> Vec<i64> {
    let mut padded: Vec<i64> = tokens.iter().map(|&t| t as i64).collect();
    if padded.len() < len {
        padded.resize(len, value);
    }
    padded
}

fn pad_rows<'a, I>(rows: I, len: usize, value: i64) -> Result<Array2<i64>>
where
    I: ExactSizeIterator<Item = &'a [u32]>,
{
    let batch = rows.len();
    let flat: Vec<i64> = rows.flat_map(|row| pad_right(row, len, value)).collect();
    Array2::from_shape_vec((batch, len), flat)
        .map_err(|e| CollateError::Shape(e).into())
}

/// Replace [`IGNORE_INDEX`] with `eot` so a label row can be detokenized.
pub fn unmask_labels(labels: &[i64], eot: u32) -> Vec<u32> {
    labels
        .iter()
        .map(|&id| if id == IGNORE_INDEX { eot } else { id as u32 })
        .collect()
}
