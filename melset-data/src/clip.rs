//! Fixed clip length configuration for feature extraction.

use crate::audio::{CHUNK_LENGTH, SAMPLE_RATE};
use crate::error::{ConfigError, Result};

/// Default clip duration in seconds (the Whisper context window)
const DEFAULT_CLIP_DURATION: f32 = CHUNK_LENGTH as f32;

/// Length every utterance is padded or trimmed to before feature extraction.
#[derive(clap::Args, Clone, Copy, Debug)]
pub struct ClipConfig {
    /// Clip duration in seconds; longer utterances are truncated
    #[arg(long = "clip-duration", default_value_t = DEFAULT_CLIP_DURATION)]
    pub duration: f32,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_CLIP_DURATION,
        }
    }
}

impl ClipConfig {
    /// Create a new clip configuration.
    pub fn new(duration_sec: f32) -> Result<Self> {
        let config = Self {
            duration: duration_sec,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject durations shorter than a single sample.
    pub fn validate(&self) -> Result<()> {
        if !(self.duration.is_finite() && self.clip_samples() > 0) {
            return Err(ConfigError::InvalidClipDuration(self.duration).into());
        }
        Ok(())
    }

    /// Get clip size in samples at 16kHz.
    pub fn clip_samples(&self) -> usize {
        self.samples_at(SAMPLE_RATE)
    }

    /// Get clip size in samples at `sample_rate`.
    pub fn samples_at(&self, sample_rate: u32) -> usize {
        (self.duration * sample_rate as f32) as usize
    }
}
