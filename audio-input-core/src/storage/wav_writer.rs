use std::fs::{self, File};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::config::{AudioStreamConfig, SampleEncoding};
use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::processing::{pcm, wav_format};
use crate::storage::metadata;

/// Streaming WAV file writer.
///
/// ## File Format
///
/// ```text
/// [44-byte WAV header]
/// [PCM or IEEE float data, little-endian, interleaved...]
/// ```
///
/// The header is written with a zero data size on `open` and patched on
/// `close`, so an interrupted write leaves a file that declares no frames
/// rather than frames it does not contain.
pub struct WavFileWriter {
    file_path: PathBuf,
    encoding: SampleEncoding,
    channels: u16,
    file: Option<BufWriter<File>>,
    scratch: Vec<u8>,
    total_bytes_written: u64,
}

impl WavFileWriter {
    pub fn new(file_path: PathBuf, encoding: SampleEncoding) -> Self {
        Self {
            file_path,
            encoding,
            channels: 0,
            file: None,
            scratch: Vec::new(),
            total_bytes_written: 0,
        }
    }

    /// Create the file and write the initial 44-byte WAV header.
    pub fn open(&mut self, sample_rate: u32, channels: u16) -> Result<(), CaptureError> {
        if self.file.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;
        }

        let header = wav_format::generate_wav_header(self.encoding, sample_rate, channels, 0)?;
        let file = File::create(&self.file_path)
            .map_err(|e| CaptureError::StorageError(format!("failed to create file: {}", e)))?;
        self.file = Some(BufWriter::new(file));
        self.channels = channels;
        self.total_bytes_written = 0;
        self.write_raw(&header)
    }

    /// Encode and append interleaved samples.
    pub fn write_samples(&mut self, samples: &[f32]) -> Result<(), CaptureError> {
        if self.file.is_none() {
            return Err(CaptureError::StorageError("file is not open for writing".into()));
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        pcm::encode_samples(samples, self.encoding, &mut scratch);

        let data_size = self.data_bytes() + scratch.len() as u64;
        let result = if data_size > wav_format::max_data_size() {
            Err(CaptureError::StorageError("recording exceeds the 4 GiB WAV limit".into()))
        } else {
            self.write_raw(&scratch)
        };
        self.scratch = scratch;
        result
    }

    /// Finalize the file: patch the RIFF and data sizes, flush, and return
    /// the SHA-256 checksum of the finished file.
    pub fn close(&mut self) -> Result<String, CaptureError> {
        let data_size = self.data_bytes();
        let mut writer = self
            .file
            .take()
            .ok_or_else(|| CaptureError::StorageError("file is not open".into()))?;

        let mut sizes = [0u8; wav_format::WAV_HEADER_SIZE];
        wav_format::patch_file_size(&mut sizes, self.total_bytes_written);
        wav_format::patch_data_size(&mut sizes, data_size);

        writer
            .seek(SeekFrom::Start(4))
            .and_then(|_| writer.write_all(&sizes[4..8]))
            .and_then(|_| writer.seek(SeekFrom::Start(40)))
            .and_then(|_| writer.write_all(&sizes[40..44]))
            .and_then(|_| writer.flush())
            .map_err(|e| CaptureError::StorageError(format!("failed to finalize header: {}", e)))?;

        let file = writer
            .into_inner()
            .map_err(|e| CaptureError::StorageError(format!("failed to flush file: {}", e.error())))?;
        file.sync_all()
            .map_err(|e| CaptureError::StorageError(format!("failed to sync file: {}", e)))?;
        drop(file);

        sha256_file(&self.file_path)
    }

    /// Bytes of sample data written so far, excluding the header.
    pub fn data_bytes(&self) -> u64 {
        self.total_bytes_written
            .saturating_sub(wav_format::WAV_HEADER_SIZE as u64)
    }

    /// Whole frames written so far.
    pub fn frames_written(&self) -> u64 {
        let frame_bytes = self.encoding.bytes_per_sample() as u64 * self.channels.max(1) as u64;
        self.data_bytes() / frame_bytes
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| CaptureError::StorageError("file is not open".into()))?;
        file.write_all(data)
            .map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;
        self.total_bytes_written += data.len() as u64;
        Ok(())
    }
}

/// Write `samples` (whole interleaved frames) to `path` as a WAV file in the
/// config's encoding, plus the metadata sidecar if the config asks for one.
///
/// The WAV file decides success: a sidecar that cannot be written is logged
/// and the finished recording is still returned.
pub fn save_wav(
    path: &Path,
    config: &AudioStreamConfig,
    samples: &[f32],
    device: Option<String>,
) -> Result<RecordingResult, CaptureError> {
    let frames = samples.len() / config.channels as usize;

    let mut writer = WavFileWriter::new(path.to_path_buf(), config.encoding);
    writer.open(config.sample_rate, config.channels)?;
    writer.write_samples(samples)?;
    let checksum = writer.close()?;

    let metadata = RecordingMetadata::new(config, frames, &path.to_string_lossy(), &checksum, device);
    if config.write_metadata {
        if let Err(e) = metadata::write_metadata(&metadata, path) {
            log::warn!("Recording saved without metadata sidecar: {}", e);
        }
    }

    Ok(RecordingResult {
        file_path: path.to_path_buf(),
        frames,
        duration_secs: metadata.duration_secs,
        checksum,
        metadata,
    })
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, CaptureError> {
    let data = fs::read(path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
