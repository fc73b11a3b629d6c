use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::audio_models::CaptureDiagnostics;
use crate::models::config::AudioStreamConfig;
use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecordingState;
use crate::processing::capture_buffer::CaptureBuffer;
use crate::session::bridge::{CaptureBridge, SharedCapture};
use crate::storage::wav_writer;
use crate::traits::input_provider::InputProvider;
use crate::traits::stream_delegate::StreamDelegate;

/// An audio input stream that records into a fixed-size buffer and saves it
/// to disk on demand.
///
/// Generic over the device backend via the `InputProvider` trait. Data flow:
/// ```text
/// [Provider callback] → [CaptureBridge] → [CaptureBuffer] → save() → [WAV file]
///                                ↑
///       record / pause / stop / clear (gated by atomic state + write gate)
/// ```
///
/// State transitions and clears take `&mut self`; queries and saves take
/// `&self`. The device callback runs concurrently on the backend's thread and
/// only reaches the buffer through the bridge.
pub struct AudioInputStream<P: InputProvider> {
    path: PathBuf,
    config: AudioStreamConfig,
    provider: P,
    shared: Arc<SharedCapture>,
    delegate: Option<Arc<dyn StreamDelegate>>,
}

impl<P: InputProvider> AudioInputStream<P> {
    /// Create a stopped stream that will save to `path` and can hold
    /// `capacity_frames` frames of `config.channels` samples each.
    pub fn new(
        path: impl Into<PathBuf>,
        config: AudioStreamConfig,
        capacity_frames: usize,
        provider: P,
    ) -> Result<Self, CaptureError> {
        config.validate()?;
        if capacity_frames == 0 {
            return Err(CaptureError::ConfigurationFailed("buffer capacity must be positive".into()));
        }
        let buffer = CaptureBuffer::new(capacity_frames, config.channels as usize).ok_or_else(|| {
            CaptureError::ConfigurationFailed(format!(
                "buffer of {} frames x {} channels is too large",
                capacity_frames, config.channels
            ))
        })?;

        Ok(Self {
            path: path.into(),
            config,
            provider,
            shared: Arc::new(SharedCapture::new(buffer)),
            delegate: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn StreamDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Start or resume recording.
    ///
    /// From `Stopped` this opens the device stream and continues writing at
    /// the current cursor. From `Paused` it resumes on the open stream.
    /// Recording again is a no-op. If the device stream cannot be opened the
    /// state stays `Stopped`.
    pub fn record(&mut self) -> Result<(), CaptureError> {
        match self.state() {
            RecordingState::Recording => Ok(()),
            RecordingState::Paused => {
                self.transition(RecordingState::Recording);
                Ok(())
            }
            RecordingState::Stopped => {
                let bridge = CaptureBridge::new(Arc::clone(&self.shared));
                let callback = Box::new(move |samples: &[f32]| bridge.on_input(samples));

                if let Err(e) = self.provider.open(&self.config, callback) {
                    log::error!("Failed to open input stream: {}", e);
                    self.notify_error(&e);
                    return Err(e);
                }

                log::info!(
                    "Input stream opened on {} ({} Hz, {} ch, {} frames/callback)",
                    self.provider.device_info().name,
                    self.config.sample_rate,
                    self.config.channels,
                    self.config.frames_per_buffer
                );
                self.transition(RecordingState::Recording);
                Ok(())
            }
        }
    }

    /// Pause recording. The device stream stays open and incoming blocks are
    /// discarded. No-op unless recording.
    pub fn pause(&mut self) -> Result<(), CaptureError> {
        if self.state().is_recording() {
            self.transition(RecordingState::Paused);
        }
        Ok(())
    }

    /// Stop recording: close the device stream and reset the write cursor
    /// to 0. Sample content is not erased. No-op when already stopped.
    ///
    /// A failure to close is reported, but the stream still ends up stopped.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        if self.state().is_stopped() {
            return Ok(());
        }

        // Flip first so any callback racing the close discards its block.
        self.transition(RecordingState::Stopped);
        let closed = self.provider.close();
        self.shared.with_writes_blocked(|buffer| buffer.clear());

        match closed {
            Ok(()) => {
                log::info!("Input stream closed");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to close input stream: {}", e);
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    pub fn state(&self) -> RecordingState {
        self.shared.state()
    }

    pub fn is_recording(&self) -> bool {
        self.state().is_recording()
    }

    /// False when stopped: only an open stream can be paused.
    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    pub fn is_stopped(&self) -> bool {
        self.state().is_stopped()
    }

    pub fn is_buffer_full(&self) -> bool {
        self.shared.buffer().is_full()
    }

    /// Frames recorded so far (the write cursor).
    pub fn position_frames(&self) -> usize {
        self.shared.buffer().position()
    }

    pub fn capacity_frames(&self) -> usize {
        self.shared.buffer().capacity_frames()
    }

    pub fn recorded_duration_secs(&self) -> f64 {
        self.config.frames_to_secs(self.position_frames())
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        self.shared.diagnostics()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &AudioStreamConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Discard the whole recording. Allowed in any state; while recording,
    /// capture continues from frame 0.
    pub fn clear_buffer(&mut self) {
        self.shared.with_writes_blocked(|buffer| buffer.clear());
        log::debug!("Capture buffer cleared");
    }

    /// Erase frames `[start, end)`. See `CaptureBuffer::clear_range` for how
    /// the cursor moves.
    pub fn clear_buffer_range(&mut self, start: usize, end: usize) -> Result<(), CaptureError> {
        self.shared
            .with_writes_blocked(|buffer| buffer.clear_range(start, end))?;
        log::debug!(
            "Cleared frames {}..{} (cursor now {})",
            start,
            end,
            self.position_frames()
        );
        Ok(())
    }

    /// Save the recorded frames to the configured path.
    ///
    /// Returns `false` if the file could not be written; the failure is
    /// logged and passed to the delegate. A metadata sidecar that cannot be
    /// written only logs a warning. Does not change state.
    pub fn save(&self) -> bool {
        self.save_to(&self.path).is_ok()
    }

    /// Save the recorded frames `[0, position)` to `path`.
    pub fn save_to(&self, path: &Path) -> Result<RecordingResult, CaptureError> {
        let samples = self.shared.buffer().snapshot();
        self.persist(path, &samples)
    }

    /// Save recorded frames `[start, end)` to `path`. `end` may not pass the
    /// write cursor.
    pub fn save_range(&self, path: &Path, start: usize, end: usize) -> Result<RecordingResult, CaptureError> {
        let samples = self.shared.buffer().snapshot_range(start, end)?;
        self.persist(path, &samples)
    }

    fn persist(&self, path: &Path, samples: &[f32]) -> Result<RecordingResult, CaptureError> {
        let device = Some(self.provider.device_info().name);
        match wav_writer::save_wav(path, &self.config, samples, device) {
            Ok(result) => {
                log::info!(
                    "Saved {} frames ({:.2}s) to {}",
                    result.frames,
                    result.duration_secs,
                    result.file_path.display()
                );
                if let Some(ref delegate) = self.delegate {
                    delegate.on_saved(&result);
                }
                Ok(result)
            }
            Err(e) => {
                log::error!("Failed to save recording to {}: {}", path.display(), e);
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    fn transition(&self, new_state: RecordingState) {
        let old_state = self.shared.state();
        self.shared.set_state(new_state);
        log::debug!("Input stream state: {:?} -> {:?}", old_state, new_state);
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(new_state);
        }
    }

    fn notify_error(&self, error: &CaptureError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }
}

impl<P: InputProvider> Drop for AudioInputStream<P> {
    /// Close the device stream before the buffer goes away. The cursor is
    /// left alone.
    fn drop(&mut self) {
        if !self.state().is_active() && !self.provider.is_open() {
            return;
        }
        self.shared.set_state(RecordingState::Stopped);
        if let Err(e) = self.provider.close() {
            log::error!("Failed to close input stream on drop: {}", e);
        }
    }
}
