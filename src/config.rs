use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::audio::AudioFormat;

/// Environment variables override the file, e.g. `VOICE_RELAY_GEMINI__API_KEY`.
const ENV_PREFIX: &str = "VOICE_RELAY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub gemini: GeminiConfig,
    pub elevenlabs: ElevenLabsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub tcp: TcpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "voice-relay".to_string(),
            tcp: TcpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TcpConfig {
    pub host: String,
    pub port: u16,
    /// Pending connections queued while a session is running
    pub backlog: u32,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50007,
            backlog: 1,
        }
    }
}

impl TcpConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Bytes per sample (2 = 16-bit PCM)
    pub sample_width: u16,
    /// Socket read size in bytes
    pub chunk_size: usize,
    /// ASCII marker the device sends after the last audio byte
    pub end_marker: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            sample_width: 2,
            chunk_size: 1024,
            end_marker: "END_RECORDING_SIGNAL".to_string(),
        }
    }
}

impl AudioConfig {
    pub fn format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
            sample_width: self.sample_width,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Instruction sent alongside every recording
    pub prompt: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            prompt: "You are a helpful assistant. Provide a concise answer to the following audio."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    /// Raw PCM so the device can play it without decoding
    pub output_format: String,
    pub base_url: String,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            voice_id: "EXAVITQu4vr4xnSDxMaL".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "pcm_16000".to_string(),
            base_url: "https://api.elevenlabs.io".to_string(),
        }
    }
}

impl Config {
    /// Load from an optional config file (any format the `config` crate
    /// recognises by extension) layered under `VOICE_RELAY_*` variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.audio.end_marker.is_empty(), "audio.end_marker must not be empty");
        ensure!(self.audio.chunk_size > 0, "audio.chunk_size must be greater than 0");
        ensure!(self.audio.sample_rate > 0, "audio.sample_rate must be greater than 0");
        ensure!(self.audio.channels > 0, "audio.channels must be greater than 0");
        ensure!(
            (1..=4).contains(&self.audio.sample_width),
            "audio.sample_width must be between 1 and 4 bytes, got {}",
            self.audio.sample_width
        );
        ensure!(self.service.tcp.backlog > 0, "service.tcp.backlog must be greater than 0");
        self.audio
            .format()
            .validate()
            .context("audio settings do not fit a WAV header")?;
        Ok(())
    }
}
