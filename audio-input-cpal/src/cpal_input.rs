//! cpal input stream provider.
//!
//! Opens an input stream on a cpal device with the stream config's sample
//! rate, channel count and callback size, and hands every block to the
//! `InputCallback` as interleaved f32.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, Stream, StreamConfig};

use audio_input_core::models::audio_models::AudioSource;
use audio_input_core::models::config::AudioStreamConfig;
use audio_input_core::models::error::CaptureError;
use audio_input_core::traits::input_provider::{CallbackFlow, InputCallback, InputProvider};

use crate::device_enumerator;

/// Samples converted per step for integer device formats. Lives on the
/// callback's stack so conversion never allocates.
const SCRATCH_SAMPLES: usize = 4096;

/// cpal-backed input device.
///
/// `cpal::Stream` is not `Send`, so neither is this provider; keep the
/// `AudioInputStream` that owns it on one thread.
pub struct CpalInputProvider {
    device_name: Option<String>,
    stream: Option<Stream>,
    buffer_full: Arc<AtomicBool>,
}

impl CpalInputProvider {
    /// Provider for the host's default input device.
    pub fn default_device() -> Self {
        Self {
            device_name: None,
            stream: None,
            buffer_full: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Provider for the input device with the given name.
    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
            ..Self::default_device()
        }
    }

    /// Whether the capture callback has reported a full buffer since the
    /// stream was opened.
    pub fn buffer_full_reported(&self) -> bool {
        self.buffer_full.load(Ordering::Relaxed)
    }
}

impl Default for CpalInputProvider {
    fn default() -> Self {
        Self::default_device()
    }
}

impl InputProvider for CpalInputProvider {
    fn open(&mut self, config: &AudioStreamConfig, mut callback: InputCallback) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Err(CaptureError::Device("input stream already open".into()));
        }

        let device = device_enumerator::resolve_device(self.device_name.as_deref())?;
        let sample_format = device
            .default_input_config()
            .map_err(|e| CaptureError::Device(format!("failed to query input config: {}", e)))?
            .sample_format();

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: BufferSize::Fixed(config.frames_per_buffer),
        };

        // Whole frames per conversion step, so a block is never split mid-frame.
        let chunk = (SCRATCH_SAMPLES / config.channels as usize) * config.channels as usize;

        self.buffer_full.store(false, Ordering::Relaxed);
        let buffer_full = Arc::clone(&self.buffer_full);
        let report = move |flow: CallbackFlow| {
            if flow == CallbackFlow::Complete {
                buffer_full.store(true, Ordering::Relaxed);
            }
        };
        let on_error = |err: cpal::StreamError| {
            log::error!("Input stream error: {}", err);
        };

        let built = match sample_format {
            SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| report(callback(data)),
                on_error,
                None,
            ),
            SampleFormat::I16 => {
                let mut scratch = [0.0f32; SCRATCH_SAMPLES];
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        for block in data.chunks(chunk) {
                            let out = &mut scratch[..block.len()];
                            for (dst, &src) in out.iter_mut().zip(block) {
                                *dst = i16_to_f32(src);
                            }
                            report(callback(out));
                        }
                    },
                    on_error,
                    None,
                )
            }
            SampleFormat::U16 => {
                let mut scratch = [0.0f32; SCRATCH_SAMPLES];
                device.build_input_stream(
                    &stream_config,
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        for block in data.chunks(chunk) {
                            let out = &mut scratch[..block.len()];
                            for (dst, &src) in out.iter_mut().zip(block) {
                                *dst = u16_to_f32(src);
                            }
                            report(callback(out));
                        }
                    },
                    on_error,
                    None,
                )
            }
            other => {
                return Err(CaptureError::Device(format!(
                    "unsupported input sample format: {:?}",
                    other
                )))
            }
        };

        let stream = built.map_err(|e| CaptureError::Device(format!("failed to build input stream: {}", e)))?;
        stream
            .play()
            .map_err(|e| CaptureError::Device(format!("failed to start input stream: {}", e)))?;

        log::info!(
            "cpal input stream started ({:?}, {} Hz, {} ch, {} frames/buffer)",
            sample_format,
            config.sample_rate,
            config.channels,
            config.frames_per_buffer
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        let paused = stream
            .pause()
            .map_err(|e| CaptureError::Device(format!("failed to pause input stream: {}", e)));
        // Dropping the stream tears down the backend callback.
        drop(stream);
        paused
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn device_info(&self) -> AudioSource {
        let name = match &self.device_name {
            Some(name) => name.clone(),
            None => device_enumerator::resolve_device(None)
                .ok()
                .and_then(|d| d.name().ok())
                .unwrap_or_else(|| "Default Input".into()),
        };
        AudioSource {
            id: self.device_name.clone().unwrap_or_else(|| "default-input".into()),
            name,
            is_default: self.device_name.is_none(),
        }
    }
}

fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

fn u16_to_f32(sample: u16) -> f32 {
    (sample as f32 - 32768.0) / 32768.0
}
