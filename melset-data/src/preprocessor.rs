//! Audio preprocessor for Whisper models.

use crate::audio::MelSpectrogram;
use crate::clip::ClipConfig;
use crate::traits::AudioPreprocessor;
use ndarray::Array2;

/// Whisper audio preprocessor.
///
/// Pads or trims audio to a fixed clip and extracts log-mel features.
#[derive(Clone, Copy, Debug)]
pub struct WhisperPreprocessor {
    mel: MelSpectrogram,
    clip: ClipConfig,
}

impl WhisperPreprocessor {
    /// Create a preprocessor from explicit mel and clip settings.
    pub fn new(mel: MelSpectrogram, clip: ClipConfig) -> Self {
        Self { mel, clip }
    }

    /// 80-band preprocessor over 30-second clips.
    pub fn whisper() -> Self {
        Self::new(MelSpectrogram::WHISPER, ClipConfig::default())
    }

    /// 128-band preprocessor over 30-second clips (large-v3).
    pub fn whisper_v3() -> Self {
        Self::new(MelSpectrogram::WHISPER_V3, ClipConfig::default())
    }

    /// Get the mel-spectrogram configuration.
    pub fn mel(&self) -> &MelSpectrogram {
        &self.mel
    }
}

impl Default for WhisperPreprocessor {
    fn default() -> Self {
        Self::whisper()
    }
}

impl AudioPreprocessor for WhisperPreprocessor {
    fn sample_rate(&self) -> u32 {
        self.mel.sample_rate as u32
    }

    fn n_samples(&self) -> usize {
        self.clip.samples_at(self.sample_rate())
    }

    fn feature_shape(&self) -> (usize, usize) {
        (self.mel.n_mels, self.mel.num_frames(self.n_samples()))
    }

    fn log_mel_spectrogram(&self, audio: &[f32]) -> Array2<f32> {
        self.mel.apply(audio)
    }
}
