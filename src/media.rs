//! Decoding of inline base64 audio attached to agent responses.

use base64::{engine::general_purpose, Engine as _};
use playground_types::AudioData;
use thiserror::Error;

pub const DEFAULT_AUDIO_MIME_TYPE: &str = "audio/mpeg";
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_CHANNELS: u16 = 1;

const PCM16_MIME_TYPE: &str = "audio/pcm16";
const WAV_MIME_TYPE: &str = "audio/wav";
const WAV_HEADER_LEN: usize = 44;

#[derive(Debug, Error)]
pub enum AudioDecodeError {
    #[error("invalid base64 audio payload: {source}")]
    InvalidBase64 {
        #[source]
        source: base64::DecodeError,
    },

    #[error("audio payload of {len} bytes does not fit in a WAV container")]
    TooLarge { len: usize },
}

/// Playable audio bytes and the mime type they should be served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Decodes base64 audio. Raw `audio/pcm16` samples are wrapped in a 16-bit
/// PCM WAV container and reported as `audio/wav`.
pub fn decode_base64_audio(
    data: &str,
    mime_type: &str,
    sample_rate: u32,
    channels: u16,
) -> Result<DecodedAudio, AudioDecodeError> {
    let samples = general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|source| AudioDecodeError::InvalidBase64 { source })?;

    if mime_type != PCM16_MIME_TYPE {
        return Ok(DecodedAudio {
            mime_type: mime_type.to_string(),
            bytes: samples,
        });
    }

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + samples.len());
    bytes.extend_from_slice(&wav_header(samples.len(), sample_rate, channels)?);
    bytes.extend_from_slice(&samples);
    Ok(DecodedAudio {
        mime_type: WAV_MIME_TYPE.to_string(),
        bytes,
    })
}

/// Decodes the inline payload of `audio`, if it carries one.
pub fn decode_audio_data(audio: &AudioData) -> Option<Result<DecodedAudio, AudioDecodeError>> {
    let data = audio.base64_audio.as_deref()?;
    Some(decode_base64_audio(
        data,
        audio.mime_type.as_deref().unwrap_or(DEFAULT_AUDIO_MIME_TYPE),
        audio.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE),
        audio.channels.unwrap_or(DEFAULT_CHANNELS),
    ))
}

fn wav_header(
    data_len: usize,
    sample_rate: u32,
    channels: u16,
) -> Result<[u8; WAV_HEADER_LEN], AudioDecodeError> {
    let too_large = || AudioDecodeError::TooLarge { len: data_len };
    let data_len = u32::try_from(data_len).map_err(|_| too_large())?;
    let riff_len = data_len.checked_add(36).ok_or_else(too_large)?;

    let block_align = channels.saturating_mul(2);
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));

    let mut header = [0u8; WAV_HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_len.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&16u16.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_len.to_le_bytes());
    Ok(header)
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose, Engine as _};
    use playground_types::AudioData;

    use super::{decode_audio_data, decode_base64_audio, AudioDecodeError};

    #[test]
    fn pcm16_is_wrapped_in_wav_header() {
        let samples = [1u8, 2, 3, 4];
        let encoded = general_purpose::STANDARD.encode(samples);

        let decoded = decode_base64_audio(&encoded, "audio/pcm16", 24_000, 1)
            .expect("pcm16 payload should decode");

        assert_eq!(decoded.mime_type, "audio/wav");
        assert_eq!(decoded.bytes.len(), 48);
        assert_eq!(&decoded.bytes[0..4], b"RIFF");
        assert_eq!(&decoded.bytes[4..8], &40u32.to_le_bytes());
        assert_eq!(&decoded.bytes[8..12], b"WAVE");
        assert_eq!(&decoded.bytes[24..28], &24_000u32.to_le_bytes());
        assert_eq!(&decoded.bytes[28..32], &48_000u32.to_le_bytes());
        assert_eq!(&decoded.bytes[40..44], &4u32.to_le_bytes());
        assert_eq!(&decoded.bytes[44..], &samples);
    }

    #[test]
    fn other_mime_types_pass_through() {
        let encoded = general_purpose::STANDARD.encode(b"mp3-bytes");
        let decoded =
            decode_base64_audio(&encoded, "audio/mpeg", 44_100, 2).expect("payload should decode");
        assert_eq!(decoded.mime_type, "audio/mpeg");
        assert_eq!(decoded.bytes, b"mp3-bytes");
    }

    #[test]
    fn invalid_base64_is_an_error() {
        let error = decode_base64_audio("not base64!!", "audio/mpeg", 44_100, 1)
            .expect_err("invalid payload should fail");
        assert!(matches!(error, AudioDecodeError::InvalidBase64 { .. }));
    }

    #[test]
    fn audio_without_inline_payload_is_skipped() {
        let audio = AudioData {
            url: Some("https://cdn.example.com/a.mp3".to_string()),
            ..AudioData::default()
        };
        assert!(decode_audio_data(&audio).is_none());
    }
}
