//! Audio loading and log-mel feature extraction.

use crate::error::{AudioError, Result};
use claxon::FlacReader;
use hound::{SampleFormat, WavReader};
use ndarray::{Array2, Axis};
use std::f32::consts::PI;
use std::path::Path;

/// Expected sample rate for Whisper models (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// FFT window size (25ms at 16kHz)
pub const N_FFT: usize = 400;

/// Hop between STFT frames (10ms at 16kHz)
pub const HOP_LENGTH: usize = 160;

/// Length of every input clip in seconds
pub const CHUNK_LENGTH: usize = 30;

/// Samples in a 30-second clip
pub const N_SAMPLES: usize = CHUNK_LENGTH * SAMPLE_RATE as usize;

/// Mel frames in a 30-second clip
pub const N_FRAMES: usize = N_SAMPLES / HOP_LENGTH;

/// Log-mel spectrogram extractor matching the Whisper front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MelSpectrogram {
    pub n_mels: usize,
    pub n_fft: usize,
    pub hop_length: usize,
    pub sample_rate: usize,
}

impl MelSpectrogram {
    /// Whisper tiny through large-v2 (80 mel bands).
    pub const WHISPER: Self = Self {
        n_mels: 80,
        n_fft: N_FFT,
        hop_length: HOP_LENGTH,
        sample_rate: SAMPLE_RATE as usize,
    };

    /// Whisper large-v3 (128 mel bands).
    pub const WHISPER_V3: Self = Self {
        n_mels: 128,
        ..Self::WHISPER
    };

    /// Number of frames produced for `num_samples` input samples.
    pub fn num_frames(&self, num_samples: usize) -> usize {
        num_samples / self.hop_length
    }

    /// Apply log-mel extraction to audio samples.
    ///
    /// # Arguments
    ///
    /// * `audio` - 16kHz mono audio samples
    ///
    /// # Returns
    ///
    /// 2D array of log-mel features `(n_mels, num_frames)`
    pub fn apply(&self, audio: &[f32]) -> Array2<f32> {
        log_mel_spectrogram(audio, self)
    }

    /// Mel filterbank `(n_mels, n_fft / 2 + 1)` for this configuration.
    pub fn filterbank(&self) -> Array2<f32> {
        create_mel_filterbank(self.n_fft, self.n_mels, self.sample_rate)
    }
}

/// Load audio from a FLAC or WAV file.
///
/// Returns a `(channels, samples)` waveform scaled to [-1, 1] and its sample rate.
///
/// # Errors
///
/// Returns error if file cannot be read or has an unsupported format.
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<(Array2<f32>, u32)> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("flac") => load_flac(path),
        Some("wav") => load_wav(path),
        _ => Err(AudioError::UnsupportedFormat(path.display().to_string()).into()),
    }
}

fn load_wav(path: &Path) -> Result<(Array2<f32>, u32)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<_>>()?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample as u32);
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<hound::Result<_>>()?
        }
    };

    let waveform = deinterleave(samples, spec.channels as usize)?;
    Ok((waveform, spec.sample_rate))
}

fn load_flac(path: &Path) -> Result<(Array2<f32>, u32)> {
    let mut reader = FlacReader::open(path)?;
    let info = reader.streaminfo();
    let scale = int_scale(info.bits_per_sample);

    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|s| s as f32 / scale))
        .collect::<claxon::Result<_>>()?;

    let waveform = deinterleave(samples, info.channels as usize)?;
    Ok((waveform, info.sample_rate))
}

/// Divisor mapping signed integer samples onto [-1, 1).
fn int_scale(bits_per_sample: u32) -> f32 {
    if bits_per_sample > 1 {
        (1_i64 << (bits_per_sample - 1)) as f32
    } else {
        1.0
    }
}

/// Split interleaved samples into a `(channels, frames)` array.
fn deinterleave(samples: Vec<f32>, channels: usize) -> Result<Array2<f32>> {
    if channels == 0 {
        return Err(AudioError::InvalidChannels(0).into());
    }

    let frames = samples.len() / channels;
    let interleaved = Array2::from_shape_vec((frames, channels), samples)
        .map_err(AudioError::Shape)?;

    Ok(interleaved.reversed_axes().as_standard_layout().into_owned())
}

/// Flatten a `(channels, samples)` waveform to mono.
///
/// A single channel is returned unchanged; multiple channels are averaged.
pub fn to_mono(waveform: &Array2<f32>) -> Result<Vec<f32>> {
    match waveform.nrows() {
        0 => Err(AudioError::InvalidChannels(0).into()),
        1 => Ok(waveform.row(0).to_vec()),
        _ => waveform
            .mean_axis(Axis(0))
            .map(|mono| mono.to_vec())
            .ok_or_else(|| AudioError::InvalidChannels(waveform.nrows()).into()),
    }
}

/// Fixed-length samples together with the number of samples dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct Trimmed {
    pub samples: Vec<f32>,
    /// Trailing samples cut off by truncation (0 when padded or exact)
    pub trimmed: usize,
}

/// Truncate or zero-pad samples to exactly `length`.
pub fn pad_or_trim(samples: &[f32], length: usize) -> Trimmed {
    let keep = samples.len().min(length);
    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(&samples[..keep]);
    out.resize(length, 0.0);

    Trimmed {
        samples: out,
        trimmed: samples.len() - keep,
    }
}

/// Create periodic Hann window for STFT.
fn hann_window(window_length: usize) -> Vec<f32> {
    (0..window_length)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / window_length as f32).cos())
        .collect()
}

/// Mirror the signal by `pad` samples on both sides, excluding the edge sample.
fn reflect_pad(audio: &[f32], pad: usize) -> Vec<f32> {
    if audio.len() <= 1 {
        let edge = audio.first().copied().unwrap_or(0.0);
        return vec![edge; audio.len() + 2 * pad];
    }

    let last = audio.len() as isize - 1;
    (-(pad as isize)..audio.len() as isize + pad as isize)
        .map(|i| {
            let mut i = i;
            while i < 0 || i > last {
                i = if i < 0 { -i } else { 2 * last - i };
            }
            audio[i as usize]
        })
        .collect()
}

/// Compute centered Short-Time Fourier Transform (STFT) power spectrogram.
///
/// The final frame is dropped so that `audio.len() / hop_length` frames remain.
fn stft(audio: &[f32], n_fft: usize, hop_length: usize) -> Array2<f32> {
    use rustfft::{FftPlanner, num_complex::Complex};

    let window = hann_window(n_fft);
    let padded = reflect_pad(audio, n_fft / 2);
    let num_frames = audio.len() / hop_length;
    let freq_bins = n_fft / 2 + 1;
    let mut spectrogram = Array2::<f32>::zeros((freq_bins, num_frames));

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut frame = vec![Complex::new(0.0, 0.0); n_fft];

    for frame_idx in 0..num_frames {
        let start = frame_idx * hop_length;

        for (i, bin) in frame.iter_mut().enumerate() {
            *bin = Complex::new(padded[start + i] * window[i], 0.0);
        }

        fft.process(&mut frame);

        for k in 0..freq_bins {
            spectrogram[[k, frame_idx]] = frame[k].norm_sqr();
        }
    }

    spectrogram
}

const MIN_LOG_HZ: f32 = 1000.0;
const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
const F_SP: f32 = 200.0 / 3.0;

fn log_step() -> f32 {
    6.4_f32.ln() / 27.0
}

/// Convert frequency in Hz to the Slaney mel scale.
fn hz_to_mel(freq: f32) -> f32 {
    if freq >= MIN_LOG_HZ {
        MIN_LOG_MEL + (freq / MIN_LOG_HZ).ln() / log_step()
    } else {
        freq / F_SP
    }
}

/// Convert Slaney mel scale to frequency in Hz.
fn mel_to_hz(mel: f32) -> f32 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Create area-normalized mel filterbank spanning 0Hz to Nyquist.
fn create_mel_filterbank(n_fft: usize, n_mels: usize, sample_rate: usize) -> Array2<f32> {
    let freq_bins = n_fft / 2 + 1;
    let mut filterbank = Array2::<f32>::zeros((n_mels, freq_bins));

    let min_mel = hz_to_mel(0.0);
    let max_mel = hz_to_mel(sample_rate as f32 / 2.0);

    let mel_points: Vec<f32> = (0..=n_mels + 1)
        .map(|i| mel_to_hz(min_mel + (max_mel - min_mel) * i as f32 / (n_mels + 1) as f32))
        .collect();

    let freq_bin_width = sample_rate as f32 / n_fft as f32;

    for mel_idx in 0..n_mels {
        let left = mel_points[mel_idx];
        let center = mel_points[mel_idx + 1];
        let right = mel_points[mel_idx + 2];
        let enorm = 2.0 / (right - left);

        for freq_idx in 0..freq_bins {
            let freq = freq_idx as f32 * freq_bin_width;
            let lower = (freq - left) / (center - left);
            let upper = (right - freq) / (right - center);

            filterbank[[mel_idx, freq_idx]] = lower.min(upper).max(0.0) * enorm;
        }
    }

    filterbank
}

/// Extract log-mel features from audio samples.
///
/// Performs the Whisper preprocessing pipeline:
/// 1. Centered STFT power spectrogram with a periodic Hann window
/// 2. Mel filterbank projection
/// 3. `log10` compression clamped 8 decades below the peak
/// 4. Affine rescale `(x + 4) / 4`
///
/// Internal function - prefer using `MelSpectrogram::apply()`.
fn log_mel_spectrogram(audio: &[f32], config: &MelSpectrogram) -> Array2<f32> {
    let spectrogram = stft(audio, config.n_fft, config.hop_length);

    let mel_filterbank = config.filterbank();
    let mut log_spec = mel_filterbank
        .dot(&spectrogram)
        .mapv(|x| x.max(1e-10).log10());

    let max_val = log_spec.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    log_spec.mapv_inplace(|x| (x.max(max_val - 8.0) + 4.0) / 4.0);

    log_spec
}
