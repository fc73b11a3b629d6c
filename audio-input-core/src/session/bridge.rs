//! Real-time side of an audio input stream.
//!
//! `SharedCapture` is everything the device callback and the control thread
//! both touch: the capture buffer, the recording flag, a write/clear gate and
//! the diagnostics counters. All of it is atomic. The callback only ever sees
//! it through `CaptureBridge`, which can write a block and read the flag.

use std::hint;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

use crate::models::audio_models::CaptureDiagnostics;
use crate::models::state::RecordingState;
use crate::processing::capture_buffer::CaptureBuffer;
use crate::traits::input_provider::CallbackFlow;

/// Gate bit held by the callback while it copies a block.
const WRITING: u8 = 0b01;
/// Gate bit held by the control thread while it mutates the buffer.
const CLEARING: u8 = 0b10;

/// Spins before the control thread starts yielding while waiting on a block copy.
const SPIN_LIMIT: u32 = 64;

#[derive(Default)]
struct Counters {
    callbacks: AtomicU64,
    captured: AtomicU64,
    discarded: AtomicU64,
    dropped: AtomicU64,
}

pub(crate) struct SharedCapture {
    state: AtomicU8,
    gate: AtomicU8,
    buffer: CaptureBuffer,
    counters: Counters,
}

impl SharedCapture {
    pub(crate) fn new(buffer: CaptureBuffer) -> Self {
        Self {
            state: AtomicU8::new(RecordingState::Stopped.as_u8()),
            gate: AtomicU8::new(0),
            buffer,
            counters: Counters::default(),
        }
    }

    pub(crate) fn state(&self) -> RecordingState {
        RecordingState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: RecordingState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Read-only view of the buffer for queries and snapshots.
    pub(crate) fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    /// Run `mutate` with callback writes held off.
    ///
    /// Raises `CLEARING`, waits for an in-flight block copy to drop `WRITING`,
    /// then hands out the buffer. Blocks arriving meanwhile are discarded by
    /// the callback. The recording state is not touched.
    pub(crate) fn with_writes_blocked<R>(&self, mutate: impl FnOnce(&CaptureBuffer) -> R) -> R {
        let _guard = ClearGuard::acquire(&self.gate);
        mutate(&self.buffer)
    }

    pub(crate) fn diagnostics(&self) -> CaptureDiagnostics {
        CaptureDiagnostics {
            callback_count: self.counters.callbacks.load(Ordering::Relaxed),
            frames_captured: self.counters.captured.load(Ordering::Relaxed),
            frames_discarded: self.counters.discarded.load(Ordering::Relaxed),
            frames_dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Releases `CLEARING` on drop, so a panicking mutation cannot wedge the callback.
struct ClearGuard<'a> {
    gate: &'a AtomicU8,
}

impl<'a> ClearGuard<'a> {
    fn acquire(gate: &'a AtomicU8) -> Self {
        gate.fetch_or(CLEARING, Ordering::AcqRel);
        let mut spins = 0;
        while gate.load(Ordering::Acquire) & WRITING != 0 {
            if spins < SPIN_LIMIT {
                hint::spin_loop();
                spins += 1;
            } else {
                thread::yield_now();
            }
        }
        Self { gate }
    }
}

impl Drop for ClearGuard<'_> {
    fn drop(&mut self) {
        self.gate.fetch_and(!CLEARING, Ordering::Release);
    }
}

/// Narrow write handle given to the device callback.
///
/// Holds no reference to the controller; it can copy a block into the capture
/// buffer and read the recording flag, nothing else.
#[derive(Clone)]
pub struct CaptureBridge {
    shared: Arc<SharedCapture>,
}

impl CaptureBridge {
    pub(crate) fn new(shared: Arc<SharedCapture>) -> Self {
        Self { shared }
    }

    /// Handle one block of interleaved input.
    ///
    /// Copies the block only while recording and no clear is in progress.
    /// Returns `Complete` once recording has filled the buffer. Bounded time,
    /// no allocation, no locks.
    pub fn on_input(&self, samples: &[f32]) -> CallbackFlow {
        let shared = &*self.shared;
        let frames = samples.len() / shared.buffer.channels();
        shared.counters.callbacks.fetch_add(1, Ordering::Relaxed);

        if !shared.state().is_recording() {
            shared.counters.discarded.fetch_add(frames as u64, Ordering::Relaxed);
            return CallbackFlow::Continue;
        }

        let previous = shared.gate.fetch_or(WRITING, Ordering::AcqRel);
        if previous & CLEARING != 0 {
            shared.gate.fetch_and(!WRITING, Ordering::Release);
            shared.counters.discarded.fetch_add(frames as u64, Ordering::Relaxed);
            return CallbackFlow::Continue;
        }

        let written = shared.buffer.write(samples, frames);
        let full = shared.buffer.is_full();
        shared.gate.fetch_and(!WRITING, Ordering::Release);

        shared.counters.captured.fetch_add(written as u64, Ordering::Relaxed);
        if written < frames {
            shared.counters.dropped.fetch_add((frames - written) as u64, Ordering::Relaxed);
        }

        if full {
            CallbackFlow::Complete
        } else {
            CallbackFlow::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    fn shared(capacity: usize, channels: usize) -> Arc<SharedCapture> {
        Arc::new(SharedCapture::new(CaptureBuffer::new(capacity, channels).unwrap()))
    }

    #[test]
    fn discards_unless_recording() {
        let shared = shared(10, 2);
        let bridge = CaptureBridge::new(Arc::clone(&shared));

        assert_eq!(bridge.on_input(&[0.5; 8]), CallbackFlow::Continue);
        shared.set_state(RecordingState::Paused);
        assert_eq!(bridge.on_input(&[0.5; 8]), CallbackFlow::Continue);
        assert_eq!(shared.buffer().position(), 0);

        shared.set_state(RecordingState::Recording);
        bridge.on_input(&[0.5; 8]);
        assert_eq!(shared.buffer().position(), 4);

        let diag = shared.diagnostics();
        assert_eq!(diag.callback_count, 3);
        assert_eq!(diag.frames_discarded, 8);
        assert_eq!(diag.frames_captured, 4);
    }

    #[test]
    fn signals_complete_when_full() {
        let shared = shared(5, 1);
        let bridge = CaptureBridge::new(Arc::clone(&shared));
        shared.set_state(RecordingState::Recording);

        assert_eq!(bridge.on_input(&[0.1; 3]), CallbackFlow::Continue);
        assert_eq!(bridge.on_input(&[0.1; 3]), CallbackFlow::Complete);
        assert_eq!(bridge.on_input(&[0.1; 3]), CallbackFlow::Complete);

        let diag = shared.diagnostics();
        assert_eq!(diag.frames_captured, 5);
        assert_eq!(diag.frames_dropped, 4);
    }

    #[test]
    fn blocks_are_discarded_while_clearing() {
        let shared = shared(10, 1);
        let bridge = CaptureBridge::new(Arc::clone(&shared));
        shared.set_state(RecordingState::Recording);

        shared.with_writes_blocked(|_| {
            assert_eq!(bridge.on_input(&[0.1; 4]), CallbackFlow::Continue);
        });
        assert_eq!(shared.buffer().position(), 0);
        assert_eq!(shared.diagnostics().frames_discarded, 4);

        // Gate released: writes go through again.
        bridge.on_input(&[0.1; 4]);
        assert_eq!(shared.buffer().position(), 4);
    }

    #[test]
    fn gate_is_released_after_a_panicking_mutation() {
        let shared = shared(10, 1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            shared.with_writes_blocked(|_| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(shared.gate.load(Ordering::Acquire), 0);
    }

    #[test]
    fn concurrent_clears_never_tear_the_cursor() {
        let shared = shared(4096, 2);
        shared.set_state(RecordingState::Recording);
        let bridge = CaptureBridge::new(Arc::clone(&shared));
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let block = [0.25f32; 64];
                while !done.load(Ordering::Acquire) {
                    bridge.on_input(&block);
                }
            })
        };

        for _ in 0..200 {
            shared.with_writes_blocked(|buffer| {
                buffer.clear();
                assert_eq!(buffer.position(), 0);
            });
            let snapshot = shared.buffer().snapshot();
            assert_eq!(snapshot.len() % 2, 0);
            assert!(snapshot.iter().all(|&s| s == 0.25));
        }

        done.store(true, Ordering::Release);
        writer.join().unwrap();
        assert!(shared.buffer().position() <= 4096);
    }
}
