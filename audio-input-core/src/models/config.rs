use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Sample encoding used when a capture buffer is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// 16-bit signed little-endian PCM.
    Pcm16,
    /// 24-bit signed little-endian PCM, packed in three bytes.
    Pcm24,
    /// 32-bit IEEE float, stored unchanged from the capture buffer.
    Float32,
}

impl SampleEncoding {
    pub fn bits_per_sample(self) -> u16 {
        match self {
            Self::Pcm16 => 16,
            Self::Pcm24 => 24,
            Self::Float32 => 32,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        self.bits_per_sample() as usize / 8
    }

    /// WAVE `fmt ` format tag: 1 for integer PCM, 3 for IEEE float.
    pub fn format_tag(self) -> u16 {
        match self {
            Self::Pcm16 | Self::Pcm24 => 1,
            Self::Float32 => 3,
        }
    }
}

/// Highest sample rate a stream config accepts, in Hz.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

/// Highest interleaved channel count a stream config accepts.
pub const MAX_CHANNELS: u16 = 32;

/// Configuration of an audio input stream.
///
/// Fixed for the lifetime of the stream: the capture buffer is sized from it
/// and the device stream is opened with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioStreamConfig {
    /// Sample rate in Hz (default: 48000).
    pub sample_rate: u32,

    /// Interleaved channel count (default: 2).
    pub channels: u16,

    /// Frames per device callback requested from the backend (default: 512).
    pub frames_per_buffer: u32,

    /// Encoding used by `save()` (default: 16-bit PCM).
    pub encoding: SampleEncoding,

    /// Write a `<file>.metadata.json` sidecar next to every saved file.
    pub write_metadata: bool,
}

impl AudioStreamConfig {
    pub fn new(sample_rate: u32, channels: u16, frames_per_buffer: u32) -> Self {
        Self {
            sample_rate,
            channels,
            frames_per_buffer,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.sample_rate == 0 || self.sample_rate > MAX_SAMPLE_RATE {
            return Err(CaptureError::ConfigurationFailed(format!(
                "unsupported sample rate: {} Hz",
                self.sample_rate
            )));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(CaptureError::ConfigurationFailed(format!(
                "unsupported channel count: {}",
                self.channels
            )));
        }
        if self.frames_per_buffer == 0 {
            return Err(CaptureError::ConfigurationFailed("frames per buffer must be positive".into()));
        }
        Ok(())
    }

    /// Duration in seconds of `frames` frames at this sample rate.
    pub fn frames_to_secs(&self, frames: usize) -> f64 {
        frames as f64 / self.sample_rate as f64
    }
}

impl Default for AudioStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            frames_per_buffer: 512,
            encoding: SampleEncoding::Pcm16,
            write_metadata: false,
        }
    }
}
