use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingMetadata;

/// Path of the JSON sidecar for `recording_path`: `{recording_path}.metadata.json`.
pub fn metadata_path(recording_path: &Path) -> PathBuf {
    let mut name = recording_path.as_os_str().to_owned();
    name.push(".metadata.json");
    PathBuf::from(name)
}

/// Write recording metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<(), CaptureError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(metadata_path(recording_path), json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read recording metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, CaptureError> {
    let json = fs::read_to_string(metadata_path(recording_path))
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    let metadata: RecordingMetadata = serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::AudioStreamConfig;

    #[test]
    fn sidecar_sits_next_to_recording() {
        let path = Path::new("/tmp/take.wav");
        assert_eq!(metadata_path(path), PathBuf::from("/tmp/take.wav.metadata.json"));
    }

    #[test]
    fn metadata_round_trip() {
        let recording = std::env::temp_dir().join("audio_input_test_meta.wav");
        let config = AudioStreamConfig::new(44100, 2, 256);
        let metadata = RecordingMetadata::new(&config, 44100, &recording.to_string_lossy(), "abc", Some("mic".into()));

        write_metadata(&metadata, &recording).unwrap();
        let loaded = read_metadata(&recording).unwrap();
        assert_eq!(loaded, metadata);
        assert_eq!(loaded.duration_secs, 1.0);

        fs::remove_file(metadata_path(&recording)).ok();
    }

    #[test]
    fn missing_sidecar_is_a_storage_error() {
        let err = read_metadata(Path::new("/nonexistent/audio_input/none.wav")).unwrap_err();
        assert!(matches!(err, CaptureError::StorageError(_)));
    }
}
