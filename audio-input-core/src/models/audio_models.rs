/// An audio input device available for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

/// Counters for debugging a capture stream.
///
/// A point-in-time copy of the atomics the device callback updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureDiagnostics {
    /// Device callback invocations since the stream was created.
    pub callback_count: u64,
    /// Frames copied into the capture buffer.
    pub frames_captured: u64,
    /// Frames delivered while paused, stopped or while a clear was in progress.
    pub frames_discarded: u64,
    /// Frames that did not fit because the capture buffer was full.
    pub frames_dropped: u64,
}
