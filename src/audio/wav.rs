use anyhow::{ensure, Context, Result};

/// Size of the canonical PCM WAV header
pub const WAV_HEADER_LEN: usize = 44;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Fixed PCM layout of every recording (16-bit mono at 16kHz by default)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Bytes per sample
    pub sample_width: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            sample_width: 2,
        }
    }
}

impl AudioFormat {
    /// `None` when the rate does not fit the 32-bit header field
    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate
            .checked_mul(u32::from(self.channels))?
            .checked_mul(u32::from(self.sample_width))
    }

    /// `None` when a frame does not fit the 16-bit header field
    pub fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.sample_width)
    }

    pub fn bits_per_sample(&self) -> Option<u16> {
        self.sample_width.checked_mul(8)
    }

    /// Check that every derived header field is representable
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.byte_rate().is_some(),
            "Byte rate of {}Hz x {} channel(s) x {} bytes overflows the WAV header",
            self.sample_rate,
            self.channels,
            self.sample_width
        );
        ensure!(
            self.block_align().is_some(),
            "Block align of {} channel(s) x {} bytes overflows the WAV header",
            self.channels,
            self.sample_width
        );
        ensure!(
            self.bits_per_sample().is_some(),
            "Sample width of {} bytes overflows the WAV header",
            self.sample_width
        );
        Ok(())
    }

    /// Playback length of `bytes` of PCM in this format
    pub fn duration_secs(&self, bytes: usize) -> f64 {
        match self.byte_rate() {
            Some(rate) if rate > 0 => bytes as f64 / f64::from(rate),
            _ => 0.0,
        }
    }
}

/// Raw PCM with a RIFF/WAVE header, ready for a collaborator that needs
/// self-describing audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavContainer {
    bytes: Vec<u8>,
}

impl WavContainer {
    /// Wrap `pcm` in a 44-byte little-endian PCM header
    pub fn encode(pcm: &[u8], format: &AudioFormat) -> Result<Self> {
        ensure!(!pcm.is_empty(), "Cannot build a WAV container from empty audio");

        let byte_rate = format.byte_rate().context("Byte rate overflows the WAV header")?;
        let block_align = format
            .block_align()
            .context("Block align overflows the WAV header")?;
        let bits_per_sample = format
            .bits_per_sample()
            .context("Sample width overflows the WAV header")?;

        let data_len = u32::try_from(pcm.len())
            .ok()
            .filter(|len| len.checked_add(36).is_some())
            .with_context(|| format!("Audio payload too large for WAV: {} bytes", pcm.len()))?;

        let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());

        // RIFF header
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(data_len + 36).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");

        // fmt subchunk
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
        bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        bytes.extend_from_slice(&format.channels.to_le_bytes());
        bytes.extend_from_slice(&format.sample_rate.to_le_bytes());
        bytes.extend_from_slice(&byte_rate.to_le_bytes());
        bytes.extend_from_slice(&block_align.to_le_bytes());
        bytes.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data subchunk
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.extend_from_slice(pcm);

        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..]
    }
}
