use anyhow::{bail, ensure, Context, Result};
use base64::Engine;
use tracing::{debug, info};

use super::messages::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use super::Responder;
use crate::audio::WavContainer;
use crate::config::GeminiConfig;

/// Answers recorded questions with Google Gemini
pub struct GeminiResponder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiResponder {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        ensure!(!config.api_key.is_empty(), "Gemini API key required (gemini.api_key)");

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body: prompt first, then the recording
    pub fn build_request(audio: &WavContainer, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "audio/wav".to_string(),
                            data: base64::engine::general_purpose::STANDARD
                                .encode(audio.as_bytes()),
                        },
                    },
                ],
            }],
        }
    }
}

#[async_trait::async_trait]
impl Responder for GeminiResponder {
    async fn respond(&self, audio: &WavContainer, prompt: &str) -> Result<String> {
        info!(
            "Sending {} byte WAV to Gemini model {}",
            audio.len(),
            self.model
        );

        let request = Self::build_request(audio, prompt);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, body);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text = body.text()?;
        debug!("Gemini returned {} characters", text.len());

        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
