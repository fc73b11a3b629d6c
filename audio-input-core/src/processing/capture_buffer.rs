use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::models::error::CaptureError;

/// Fixed-capacity linear store of interleaved f32 frames plus a write cursor.
///
/// This is a bounded recording window, not a ring: once the cursor reaches
/// `capacity_frames` further writes are truncated to nothing.
///
/// Samples live in `AtomicU32` cells (f32 bit patterns) and the cursor is an
/// `AtomicUsize`, so the buffer can be shared between the device callback and
/// the control thread without a lock. It assumes a single writer at a time;
/// `session::bridge` gates `write` against the clear operations.
pub struct CaptureBuffer {
    samples: Box<[AtomicU32]>,
    channels: usize,
    capacity_frames: usize,
    write_pos: AtomicUsize,
}

impl CaptureBuffer {
    /// Allocate a zeroed buffer of `capacity_frames * channels` samples.
    ///
    /// Returns `None` if `channels` is zero or the sample count overflows.
    pub fn new(capacity_frames: usize, channels: usize) -> Option<Self> {
        if channels == 0 {
            return None;
        }
        let capacity_samples = capacity_frames.checked_mul(channels)?;
        let samples = (0..capacity_samples)
            .map(|_| AtomicU32::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Some(Self {
            samples,
            channels,
            capacity_frames,
            write_pos: AtomicUsize::new(0),
        })
    }

    /// Copy up to `frame_count` frames from `samples` at the write cursor.
    ///
    /// Copies `min(frame_count, samples.len() / channels, capacity - position)`
    /// frames, advances the cursor by that amount and returns it. A full
    /// buffer returns 0. Never allocates or blocks.
    pub fn write(&self, samples: &[f32], frame_count: usize) -> usize {
        let pos = self.write_pos.load(Ordering::Acquire);
        let available = self.capacity_frames.saturating_sub(pos);
        let frames = frame_count.min(samples.len() / self.channels).min(available);
        if frames == 0 {
            return 0;
        }

        let start = pos * self.channels;
        let cells = &self.samples[start..start + frames * self.channels];
        for (cell, sample) in cells.iter().zip(samples) {
            cell.store(sample.to_bits(), Ordering::Relaxed);
        }

        // Publishes the sample stores to readers that load the cursor.
        self.write_pos.store(pos + frames, Ordering::Release);
        frames
    }

    /// Current write cursor in frames.
    pub fn position(&self) -> usize {
        self.write_pos.load(Ordering::Acquire)
    }

    pub fn capacity_frames(&self) -> usize {
        self.capacity_frames
    }

    pub fn capacity_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn is_full(&self) -> bool {
        self.position() == self.capacity_frames
    }

    pub fn is_empty(&self) -> bool {
        self.position() == 0
    }

    /// Reset the cursor to 0. Content past the cursor is logically erased.
    pub fn clear(&self) {
        self.write_pos.store(0, Ordering::Release);
    }

    /// Erase frames `[start, end)`.
    ///
    /// - a range reaching the cursor (`start <= position <= end`) truncates the
    ///   recording to `start`, so `clear_range(0, position)` equals `clear()`;
    /// - a range ending before the cursor is zeroed in place and stays part of
    ///   the recording as silence;
    /// - a range past the cursor only zeroes storage.
    ///
    /// Fails with `InvalidRange` and leaves the buffer untouched if
    /// `start > end` or `end > capacity_frames`.
    pub fn clear_range(&self, start: usize, end: usize) -> Result<(), CaptureError> {
        self.check_range(start, end)?;

        let pos = self.position();
        if start == 0 && end == pos {
            self.clear();
            return Ok(());
        }

        for cell in &self.samples[start * self.channels..end * self.channels] {
            cell.store(0, Ordering::Relaxed);
        }
        if start <= pos && pos <= end {
            self.write_pos.store(start, Ordering::Release);
        }
        Ok(())
    }

    /// Copy out every recorded sample.
    ///
    /// The cursor is loaded once, so the returned length is always a whole
    /// number of frames even while the callback keeps writing.
    pub fn snapshot(&self) -> Vec<f32> {
        let pos = self.position();
        self.read_samples(0, pos)
    }

    /// Copy out recorded frames `[start, end)`.
    ///
    /// Fails with `InvalidRange` for an inverted range and with
    /// `RangeNotRecorded` if `end` passes the cursor as loaded at the time of
    /// the call.
    pub fn snapshot_range(&self, start: usize, end: usize) -> Result<Vec<f32>, CaptureError> {
        self.check_range(start, end)?;
        let pos = self.position();
        if end > pos {
            return Err(CaptureError::RangeNotRecorded {
                start,
                end,
                recorded: pos,
            });
        }
        Ok(self.read_samples(start, end))
    }

    fn read_samples(&self, start: usize, end: usize) -> Vec<f32> {
        self.samples[start * self.channels..end * self.channels]
            .iter()
            .map(|cell| f32::from_bits(cell.load(Ordering::Relaxed)))
            .collect()
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), CaptureError> {
        if start > end || end > self.capacity_frames {
            return Err(CaptureError::InvalidRange {
                start,
                end,
                capacity: self.capacity_frames,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(count: usize, channels: usize, value: f32) -> Vec<f32> {
        vec![value; count * channels]
    }

    #[test]
    fn writes_advance_cursor_by_accepted_frames() {
        let buf = CaptureBuffer::new(100, 2).unwrap();

        assert_eq!(buf.write(&frames(30, 2, 0.1), 30), 30);
        assert_eq!(buf.write(&frames(50, 2, 0.2), 50), 50);
        assert_eq!(buf.position(), 80);
        assert!(!buf.is_full());

        assert_eq!(buf.write(&frames(20, 2, 0.3), 20), 20);
        assert_eq!(buf.position(), 100);
        assert!(buf.is_full());
    }

    #[test]
    fn overlong_write_is_truncated_not_wrapped() {
        let buf = CaptureBuffer::new(10, 1).unwrap();
        buf.write(&frames(7, 1, 0.5), 7);

        let incoming: Vec<f32> = (0..8).map(|i| i as f32).collect();
        assert_eq!(buf.write(&incoming, 8), 3);
        assert!(buf.is_full());
        assert_eq!(buf.capacity_samples(), 10);

        let recorded = buf.snapshot();
        assert_eq!(recorded.len(), 10);
        assert_eq!(&recorded[..7], &[0.5; 7]);
        assert_eq!(&recorded[7..], &[0.0, 1.0, 2.0]);

        // Full buffer: further writes are no-ops.
        assert_eq!(buf.write(&incoming, 8), 0);
        assert_eq!(buf.position(), 10);
    }

    #[test]
    fn write_never_reads_past_the_supplied_slice() {
        let buf = CaptureBuffer::new(10, 2).unwrap();
        // Claims 5 frames but only carries 2 whole frames plus a stray sample.
        assert_eq!(buf.write(&[0.1, 0.2, 0.3, 0.4, 0.5], 5), 2);
        assert_eq!(buf.position(), 2);
    }

    #[test]
    fn clear_after_full_resets_cursor() {
        let buf = CaptureBuffer::new(4, 2).unwrap();
        buf.write(&frames(4, 2, 1.0), 4);
        assert!(buf.is_full());

        buf.clear();
        assert!(!buf.is_full());
        assert!(buf.is_empty());
        assert!(buf.snapshot().is_empty());
    }

    #[test]
    fn clear_range_up_to_cursor_equals_clear() {
        let buf = CaptureBuffer::new(10, 1).unwrap();
        buf.write(&frames(6, 1, 1.0), 6);

        buf.clear_range(0, 6).unwrap();
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn middle_clear_keeps_cursor_and_zeroes_frames() {
        let buf = CaptureBuffer::new(10, 2).unwrap();
        buf.write(&frames(8, 2, 1.0), 8);

        buf.clear_range(2, 5).unwrap();
        assert_eq!(buf.position(), 8);

        let recorded = buf.snapshot();
        assert_eq!(&recorded[..4], &[1.0; 4]);
        assert_eq!(&recorded[4..10], &[0.0; 6]);
        assert_eq!(&recorded[10..], &[1.0; 6]);
    }

    #[test]
    fn clear_range_covering_cursor_truncates() {
        let buf = CaptureBuffer::new(10, 1).unwrap();
        buf.write(&frames(6, 1, 1.0), 6);

        buf.clear_range(4, 9).unwrap();
        assert_eq!(buf.position(), 4);

        // Recording resumes at the truncated position.
        buf.write(&frames(2, 1, 2.0), 2);
        assert_eq!(buf.snapshot(), vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn clear_range_past_cursor_leaves_recording_alone() {
        let buf = CaptureBuffer::new(10, 1).unwrap();
        buf.write(&frames(3, 1, 1.0), 3);

        buf.clear_range(5, 10).unwrap();
        assert_eq!(buf.position(), 3);
        assert_eq!(buf.snapshot(), vec![1.0; 3]);
    }

    #[test]
    fn invalid_ranges_are_rejected_without_mutation() {
        let buf = CaptureBuffer::new(10, 1).unwrap();
        buf.write(&frames(5, 1, 1.0), 5);

        assert_eq!(
            buf.clear_range(4, 2),
            Err(CaptureError::InvalidRange {
                start: 4,
                end: 2,
                capacity: 10
            })
        );
        assert!(matches!(buf.clear_range(0, 11), Err(CaptureError::InvalidRange { .. })));

        assert_eq!(buf.position(), 5);
        assert_eq!(buf.snapshot(), vec![1.0; 5]);
    }

    #[test]
    fn snapshot_range_is_bounded_by_cursor() {
        let buf = CaptureBuffer::new(10, 1).unwrap();
        buf.write(&[0.0, 1.0, 2.0, 3.0], 4);

        assert_eq!(buf.snapshot_range(1, 3).unwrap(), vec![1.0, 2.0]);
        assert_eq!(
            buf.snapshot_range(2, 5),
            Err(CaptureError::RangeNotRecorded {
                start: 2,
                end: 5,
                recorded: 4
            })
        );
        assert_eq!(
            buf.snapshot_range(3, 1),
            Err(CaptureError::InvalidRange {
                start: 3,
                end: 1,
                capacity: 10
            })
        );
        assert!(matches!(buf.snapshot_range(0, 11), Err(CaptureError::InvalidRange { .. })));
    }

    #[test]
    fn degenerate_shapes() {
        assert!(CaptureBuffer::new(10, 0).is_none());
        assert!(CaptureBuffer::new(usize::MAX, 2).is_none());

        let empty = CaptureBuffer::new(0, 2).unwrap();
        assert!(empty.is_full());
        assert_eq!(empty.write(&[1.0, 1.0], 1), 0);
    }
}
