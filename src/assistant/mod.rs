pub mod elevenlabs;
pub mod gemini;
pub mod messages;

use anyhow::Result;
use futures::stream::BoxStream;

use crate::audio::WavContainer;

pub use elevenlabs::ElevenLabsSynthesizer;
pub use gemini::GeminiResponder;

/// Lazy, forward-only sequence of synthesized PCM chunks
pub type SynthesisStream = BoxStream<'static, Result<Vec<u8>>>;

/// Turns a recorded question into response text
///
/// Implementations:
/// - Gemini: transcribes and answers in a single `generateContent` call
/// - Test doubles in `tests/common`
#[async_trait::async_trait]
pub trait Responder: Send + Sync {
    /// Submit the recording with an instruction prompt and wait for the reply
    async fn respond(&self, audio: &WavContainer, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Turns response text into speech
#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    /// Start synthesis. Chunks are pulled from the returned stream as the
    /// provider produces them.
    async fn synthesize(&self, text: &str) -> Result<SynthesisStream>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
