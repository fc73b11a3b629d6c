//! # audio-input-cpal
//!
//! cpal input backend for audio-input-core.
//!
//! Provides:
//! - `CpalInputProvider` — input stream on a cpal device (default host)
//! - `device_enumerator` — input device listing and lookup by name
//!
//! ## Usage
//! ```no_run
//! use audio_input_core::{AudioInputStream, AudioStreamConfig};
//! use audio_input_cpal::CpalInputProvider;
//!
//! let provider = CpalInputProvider::default_device();
//! let config = AudioStreamConfig::new(48000, 2, 512);
//! let mut stream = AudioInputStream::new("take.wav", config, 48000 * 10, provider)?;
//! stream.record()?;
//! // ...
//! stream.save();
//! stream.stop()?;
//! # Ok::<(), audio_input_core::CaptureError>(())
//! ```

pub mod cpal_input;
pub mod device_enumerator;

pub use cpal_input::CpalInputProvider;
pub use device_enumerator::list_input_devices;
