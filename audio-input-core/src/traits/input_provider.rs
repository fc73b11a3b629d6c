use crate::models::audio_models::AudioSource;
use crate::models::config::AudioStreamConfig;
use crate::models::error::CaptureError;

/// What the capture callback asks of the backend after each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackFlow {
    /// Keep delivering blocks.
    Continue,
    /// The capture buffer is full; nothing more will be kept until the
    /// control side makes room. The backend may stop delivering or keep
    /// calling, further calls are harmless no-ops.
    Complete,
}

/// Callback invoked on the backend's real-time thread for every input block.
///
/// Parameters:
/// - `samples`: interleaved f32 samples, `frames * channels` long.
///
/// Never blocks, allocates or panics.
pub type InputCallback = Box<dyn FnMut(&[f32]) -> CallbackFlow + Send + 'static>;

/// Capability to open a callback-driven input stream on some audio device.
///
/// Implemented by:
/// - `CpalInputProvider` (`audio-input-cpal`)
/// - `ManualInputProvider` (blocks pushed by the caller)
pub trait InputProvider {
    /// Open and start an input stream with `config`, delivering blocks to
    /// `callback` until `close` is called.
    fn open(&mut self, config: &AudioStreamConfig, callback: InputCallback) -> Result<(), CaptureError>;

    /// Stop the stream and release it.
    ///
    /// Once this returns the callback is never invoked again. Closing a
    /// provider that is not open is a no-op.
    fn close(&mut self) -> Result<(), CaptureError>;

    /// Whether a stream is currently open.
    fn is_open(&self) -> bool;

    /// Information about the device backing this provider.
    fn device_info(&self) -> AudioSource;
}
