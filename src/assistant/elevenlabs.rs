use anyhow::{bail, ensure, Context, Result};
use futures::stream::StreamExt;
use tracing::info;

use super::messages::SpeechRequest;
use super::{SynthesisStream, Synthesizer};
use crate::config::ElevenLabsConfig;

/// Streams synthesized speech from ElevenLabs as raw PCM
pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    api_key: String,
    voice_id: String,
    model_id: String,
    output_format: String,
    base_url: String,
}

impl ElevenLabsSynthesizer {
    pub fn new(config: &ElevenLabsConfig) -> Result<Self> {
        ensure!(
            !config.api_key.is_empty(),
            "ElevenLabs API key required (elevenlabs.api_key)"
        );

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            voice_id: config.voice_id.clone(),
            model_id: config.model_id.clone(),
            output_format: config.output_format.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}/stream?output_format={}",
            self.base_url, self.voice_id, self.output_format
        )
    }
}

#[async_trait::async_trait]
impl Synthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SynthesisStream> {
        info!(
            "Requesting {} speech from ElevenLabs voice {}",
            self.output_format, self.voice_id
        );

        let request = SpeechRequest {
            text: text.to_string(),
            model_id: self.model_id.clone(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach ElevenLabs")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("ElevenLabs TTS error {}: {}", status, body);
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .context("ElevenLabs audio stream interrupted")
            })
            .boxed();

        Ok(stream)
    }

    fn name(&self) -> &str {
        "elevenlabs"
    }
}
