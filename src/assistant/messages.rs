use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

/// Gemini `generateContent` request body
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String, // Base64-encoded WAV bytes
}

/// Gemini `generateContent` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all text parts joined
    pub fn text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            bail!("Gemini blocked the request: {}", reason);
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;

        let finish_reason = candidate.finish_reason;
        let parts = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default();

        let text: Vec<String> = parts.into_iter().filter_map(|part| part.text).collect();
        if text.is_empty() {
            bail!(
                "Gemini candidate contained no text (finish reason: {})",
                finish_reason.as_deref().unwrap_or("unknown")
            );
        }

        Ok(text.concat())
    }
}

/// ElevenLabs text-to-speech request body
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub model_id: String,
}
