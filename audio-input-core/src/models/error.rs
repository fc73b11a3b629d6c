use thiserror::Error;

/// Errors that can occur while capturing or persisting audio input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Opening, starting or closing the underlying device stream failed.
    #[error("device error: {0}")]
    Device(String),

    #[error("device not available")]
    DeviceNotAvailable,

    /// A clear or save range was inverted or reached past the buffer.
    #[error("invalid frame range {start}..{end} for a buffer of {capacity} frames")]
    InvalidRange {
        start: usize,
        end: usize,
        capacity: usize,
    },

    /// A save range reached past the frames recorded so far.
    #[error("frame range {start}..{end} is outside the {recorded} recorded frames")]
    RangeNotRecorded {
        start: usize,
        end: usize,
        recorded: usize,
    },

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
