use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecordingState;

/// Event delegate for audio input stream notifications.
///
/// All methods are called on the control thread that issued the command,
/// never from the device callback.
pub trait StreamDelegate: Send + Sync {
    /// Called after the recording state changes.
    fn on_state_changed(&self, state: RecordingState);

    /// Called when a device or storage operation fails.
    fn on_error(&self, error: &CaptureError);

    /// Called when a save completes and the file is finalized.
    fn on_saved(&self, result: &RecordingResult);
}
