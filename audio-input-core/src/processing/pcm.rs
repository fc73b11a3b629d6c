//! Encoding of f32 capture samples into the bytes of a WAV data chunk.

use crate::models::config::SampleEncoding;

const PCM24_MAX: f32 = 8_388_607.0;

/// Append `samples` to `out` in little-endian `encoding`.
///
/// Integer encodings clamp to `[-1.0, 1.0]` first. Output grows by
/// `samples.len() * encoding.bytes_per_sample()` bytes.
pub fn encode_samples(samples: &[f32], encoding: SampleEncoding, out: &mut Vec<u8>) {
    out.reserve(samples.len() * encoding.bytes_per_sample());
    match encoding {
        SampleEncoding::Pcm16 => {
            for &sample in samples {
                let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        SampleEncoding::Pcm24 => {
            for &sample in samples {
                let value = (sample.clamp(-1.0, 1.0) * PCM24_MAX) as i32;
                out.extend_from_slice(&value.to_le_bytes()[..3]);
            }
        }
        SampleEncoding::Float32 => {
            for &sample in samples {
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }
    }
}
