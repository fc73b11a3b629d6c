//! WAV file format utilities.
//!
//! Generates standard 44-byte RIFF WAV headers and patches the size fields
//! once the amount of written data is known.

use crate::models::config::SampleEncoding;
use crate::models::error::CaptureError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Generate a 44-byte WAV RIFF header.
///
/// Little-endian; the format tag comes from `encoding` (1 = integer PCM,
/// 3 = IEEE float). Fails if the block alignment or byte rate does not fit
/// its header field.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    file size - 8 (36 + data_size)
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (fmt chunk size)
/// [20-21]  format tag
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bits / 8
/// [32-33]  block_align = channels * bits / 8
/// [34-35]  bits per sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(
    encoding: SampleEncoding,
    sample_rate: u32,
    channels: u16,
    data_size: u32,
) -> Result<[u8; WAV_HEADER_SIZE], CaptureError> {
    let bit_depth = encoding.bits_per_sample();
    let block_align = u16::try_from(u32::from(channels) * u32::from(bit_depth) / 8)
        .map_err(|_| CaptureError::StorageError(format!("{} channels do not fit a WAV frame", channels)))?;
    let byte_rate = sample_rate.checked_mul(u32::from(block_align)).ok_or_else(|| {
        CaptureError::StorageError(format!(
            "byte rate of {} Hz x {} bytes overflows the WAV header",
            sample_rate, block_align
        ))
    })?;
    let chunk_size = 36u32.saturating_add(data_size);

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&encoding.format_tag().to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    Ok(header)
}

/// Patch the file-size field at offset 4 (RIFF chunk size = file_size - 8).
pub fn patch_file_size(header: &mut [u8], total_file_size: u64) {
    let chunk_size = (total_file_size - 8) as u32;
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
}

/// Patch the data-size field at offset 40.
pub fn patch_data_size(header: &mut [u8], data_size: u64) {
    let data_size_u32 = data_size as u32;
    header[40..44].copy_from_slice(&data_size_u32.to_le_bytes());
}

/// Largest data chunk a RIFF file can describe.
pub fn max_data_size() -> u64 {
    u32::MAX as u64 - 36
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(header: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([header[offset], header[offset + 1]])
    }

    fn u32_at(header: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([header[offset], header[offset + 1], header[offset + 2], header[offset + 3]])
    }

    #[test]
    fn header_riff_magic() {
        let header = generate_wav_header(SampleEncoding::Pcm16, 48000, 2, 0).unwrap();
        assert_eq!(header.len(), 44);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
        assert_eq!(u32_at(&header, 16), 16);
    }

    #[test]
    fn header_48khz_stereo_16bit() {
        let header = generate_wav_header(SampleEncoding::Pcm16, 48000, 2, 9600).unwrap();

        assert_eq!(u16_at(&header, 20), 1);
        assert_eq!(u16_at(&header, 22), 2);
        assert_eq!(u32_at(&header, 24), 48000);
        assert_eq!(u32_at(&header, 28), 192000); // 48000 * 2 * 16/8
        assert_eq!(u16_at(&header, 32), 4);
        assert_eq!(u16_at(&header, 34), 16);
        assert_eq!(u32_at(&header, 40), 9600);
        assert_eq!(u32_at(&header, 4), 36 + 9600);
    }

    #[test]
    fn header_float_and_24bit() {
        let float = generate_wav_header(SampleEncoding::Float32, 44100, 1, 0).unwrap();
        assert_eq!(u16_at(&float, 20), 3);
        assert_eq!(u16_at(&float, 34), 32);
        assert_eq!(u32_at(&float, 28), 176400);

        let packed = generate_wav_header(SampleEncoding::Pcm24, 48000, 2, 0).unwrap();
        assert_eq!(u16_at(&packed, 20), 1);
        assert_eq!(u16_at(&packed, 32), 6);
        assert_eq!(u32_at(&packed, 28), 288000);
    }

    #[test]
    fn oversized_byte_rate_is_an_error() {
        let err = generate_wav_header(SampleEncoding::Pcm16, u32::MAX, 2, 0).unwrap_err();
        assert!(matches!(err, CaptureError::StorageError(_)));

        assert!(generate_wav_header(SampleEncoding::Float32, 48000, u16::MAX, 0).is_err());
    }

    #[test]
    fn patch_sizes() {
        let mut header = generate_wav_header(SampleEncoding::Pcm16, 48000, 2, 0).unwrap();

        patch_data_size(&mut header, 19200);
        assert_eq!(u32_at(&header, 40), 19200);

        patch_file_size(&mut header, 19200 + 44);
        assert_eq!(u32_at(&header, 4), 19200 + 36);
    }
}
