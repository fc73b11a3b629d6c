use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::AudioSource;
use crate::models::config::AudioStreamConfig;
use crate::models::error::CaptureError;
use crate::traits::input_provider::{CallbackFlow, InputCallback, InputProvider};

#[derive(Default)]
struct ManualSlot {
    callback: Option<InputCallback>,
    channels: u16,
    fail_next_open: Option<String>,
    open_count: u64,
}

/// Input provider whose blocks are pushed by the caller instead of a device.
///
/// Feeds pre-recorded or generated audio through the normal capture path:
/// open the stream with `record()`, then push blocks through a `ManualFeed`
/// from any thread.
pub struct ManualInputProvider {
    name: String,
    slot: Arc<Mutex<ManualSlot>>,
}

/// Cloneable handle that delivers blocks to a `ManualInputProvider`.
#[derive(Clone)]
pub struct ManualFeed {
    slot: Arc<Mutex<ManualSlot>>,
}

impl ManualInputProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: Arc::new(Mutex::new(ManualSlot::default())),
        }
    }

    pub fn feed(&self) -> ManualFeed {
        ManualFeed {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl Default for ManualInputProvider {
    fn default() -> Self {
        Self::new("manual")
    }
}

impl InputProvider for ManualInputProvider {
    fn open(&mut self, config: &AudioStreamConfig, callback: InputCallback) -> Result<(), CaptureError> {
        let mut slot = self.slot.lock();
        if let Some(reason) = slot.fail_next_open.take() {
            return Err(CaptureError::Device(reason));
        }
        if slot.callback.is_some() {
            return Err(CaptureError::Device("manual input stream already open".into()));
        }
        slot.callback = Some(callback);
        slot.channels = config.channels;
        slot.open_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        // Dropping under the lock: a deliver() in flight finishes first.
        self.slot.lock().callback = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.slot.lock().callback.is_some()
    }

    fn device_info(&self) -> AudioSource {
        AudioSource {
            id: format!("manual:{}", self.name),
            name: self.name.clone(),
            is_default: false,
        }
    }
}

impl ManualFeed {
    /// Deliver one interleaved block, as a device callback would.
    ///
    /// Returns `None` if no stream is open.
    pub fn deliver(&self, samples: &[f32]) -> Option<CallbackFlow> {
        let mut slot = self.slot.lock();
        slot.callback.as_mut().map(|callback| callback(samples))
    }

    /// Deliver `frames` frames of a constant `value`, split into blocks of
    /// at most `block_frames`. Returns the flow of the last block.
    pub fn deliver_frames(&self, frames: usize, block_frames: usize, value: f32) -> Option<CallbackFlow> {
        let channels = self.slot.lock().channels.max(1) as usize;
        let block_frames = block_frames.max(1);
        let block = vec![value; block_frames * channels];

        let mut remaining = frames;
        let mut last = None;
        while remaining > 0 {
            let n = remaining.min(block_frames);
            last = Some(self.deliver(&block[..n * channels])?);
            remaining -= n;
        }
        last
    }

    /// Make the next `open` fail with `CaptureError::Device(reason)`.
    pub fn fail_next_open(&self, reason: impl Into<String>) {
        self.slot.lock().fail_next_open = Some(reason.into());
    }

    pub fn is_open(&self) -> bool {
        self.slot.lock().callback.is_some()
    }

    /// Number of successful opens so far.
    pub fn open_count(&self) -> u64 {
        self.slot.lock().open_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn delivers_only_while_open() {
        let mut provider = ManualInputProvider::new("test");
        let feed = provider.feed();
        assert_eq!(feed.deliver(&[0.0; 4]), None);

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        provider
            .open(
                &AudioStreamConfig::new(8000, 2, 4),
                Box::new(move |samples| {
                    counter.fetch_add(samples.len(), Ordering::Relaxed);
                    CallbackFlow::Continue
                }),
            )
            .unwrap();

        assert!(provider.is_open());
        assert_eq!(feed.deliver_frames(10, 4, 0.5), Some(CallbackFlow::Continue));
        assert_eq!(seen.load(Ordering::Relaxed), 20);

        provider.close().unwrap();
        assert!(!feed.is_open());
        assert_eq!(feed.deliver(&[0.0; 4]), None);
        assert_eq!(feed.open_count(), 1);
    }

    #[test]
    fn injected_open_failure_is_one_shot() {
        let mut provider = ManualInputProvider::default();
        let feed = provider.feed();
        feed.fail_next_open("unplugged");

        let config = AudioStreamConfig::default();
        let err = provider
            .open(&config, Box::new(|_| CallbackFlow::Continue))
            .unwrap_err();
        assert_eq!(err, CaptureError::Device("unplugged".into()));
        assert!(!provider.is_open());

        provider.open(&config, Box::new(|_| CallbackFlow::Continue)).unwrap();
        assert!(provider.is_open());
    }

    #[test]
    fn double_open_is_rejected() {
        let mut provider = ManualInputProvider::default();
        let config = AudioStreamConfig::default();
        provider.open(&config, Box::new(|_| CallbackFlow::Continue)).unwrap();
        assert!(provider.open(&config, Box::new(|_| CallbackFlow::Continue)).is_err());
    }
}
