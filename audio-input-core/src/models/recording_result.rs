use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::{AudioStreamConfig, SampleEncoding};

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub frames: usize,
    pub duration_secs: f64,
    pub checksum: String,
    pub metadata: RecordingMetadata,
}

/// Metadata stored alongside a saved recording.
///
/// Serializable for the JSON sidecar written by `storage::metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_path: String,
    pub created_at: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub encoding: SampleEncoding,
    pub frames: usize,
    pub duration_secs: f64,
    pub checksum: String,
    pub device: Option<String>,
}

impl RecordingMetadata {
    pub fn new(
        config: &AudioStreamConfig,
        frames: usize,
        file_path: &str,
        checksum: &str,
        device: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            sample_rate: config.sample_rate,
            channels: config.channels,
            encoding: config.encoding,
            frames,
            duration_secs: config.frames_to_secs(frames),
            checksum: checksum.to_string(),
            device,
        }
    }
}
