//! # audio-input-core
//!
//! Platform-agnostic audio input capture core.
//!
//! Records a live input stream into a fixed-capacity buffer and saves it to
//! disk on demand. Device backends implement the `InputProvider` trait and
//! plug into the generic `AudioInputStream`.
//!
//! ## Architecture
//!
//! ```text
//! audio-input-core (this crate)
//! ├── traits/       ← InputProvider, CallbackFlow, StreamDelegate
//! ├── models/       ← CaptureError, RecordingState, AudioStreamConfig, RecordingResult, etc.
//! ├── processing/   ← CaptureBuffer, PCM encoding, WAV header generation
//! ├── session/      ← AudioInputStream (state machine), CaptureBridge (device callback), ManualInputProvider
//! └── storage/      ← WavFileWriter, metadata sidecar
//! ```
//!
//! ## Threads
//!
//! The device callback only touches atomics: it never locks, allocates or
//! logs. Control operations run on the caller's thread and may block on
//! device open/close and file I/O.

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioSource, CaptureDiagnostics};
pub use models::config::{AudioStreamConfig, SampleEncoding};
pub use models::error::CaptureError;
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::RecordingState;
pub use processing::capture_buffer::CaptureBuffer;
pub use session::bridge::CaptureBridge;
pub use session::input_stream::AudioInputStream;
pub use session::manual_provider::{ManualFeed, ManualInputProvider};
pub use storage::wav_writer::WavFileWriter;
pub use traits::input_provider::{CallbackFlow, InputCallback, InputProvider};
pub use traits::stream_delegate::StreamDelegate;
