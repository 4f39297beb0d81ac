use crate::audio::AudioFormat;
use crate::config::AudioConfig;

/// Per-connection protocol settings, fixed at process start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Socket read size in bytes
    pub chunk_size: usize,

    /// Byte sequence that ends a recording
    pub end_marker: Vec<u8>,

    /// PCM layout of incoming audio
    pub format: AudioFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&AudioConfig::default())
    }
}

impl From<&AudioConfig> for SessionConfig {
    fn from(audio: &AudioConfig) -> Self {
        Self {
            chunk_size: audio.chunk_size,
            end_marker: audio.end_marker.as_bytes().to_vec(),
            format: audio.format(),
        }
    }
}
