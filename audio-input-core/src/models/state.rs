use serde::{Deserialize, Serialize};

/// Recording state machine.
///
/// State transitions:
/// ```text
/// stopped ──record──→ recording ──pause──→ paused
///    ↑                  │   ↑                │
///    └──────stop────────┘   └────record──────┘
///    ↑                                       │
///    └──────────────────stop─────────────────┘
/// ```
///
/// Stored as a `u8` inside an atomic so the real-time callback can read it
/// without locking.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RecordingState {
    #[default]
    Stopped = 0,
    Recording = 1,
    Paused = 2,
}

impl RecordingState {
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }

    pub fn is_recording(self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Whether a device stream is expected to be open in this state.
    pub fn is_active(self) -> bool {
        !self.is_stopped()
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    /// Unknown values decode as `Stopped`, which never writes.
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Recording,
            2 => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_encoding_is_stable() {
        for state in [RecordingState::Stopped, RecordingState::Recording, RecordingState::Paused] {
            assert_eq!(RecordingState::from_u8(state.as_u8()), state);
        }
        assert_eq!(RecordingState::from_u8(200), RecordingState::Stopped);
    }

    #[test]
    fn only_recording_and_paused_are_active() {
        assert!(!RecordingState::Stopped.is_active());
        assert!(RecordingState::Recording.is_active());
        assert!(RecordingState::Paused.is_active());
        assert!(!RecordingState::Stopped.is_paused());
    }
}
