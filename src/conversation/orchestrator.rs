use anyhow::{Context, Result};
use futures::stream::StreamExt;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use crate::assistant::{Responder, Synthesizer};
use crate::audio::WavContainer;
use crate::session::{Phase, RecordingSession};

/// How a conversation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationOutcome {
    /// Recording was empty; no collaborator was called
    NoAudio,
    /// Recording could not be wrapped as WAV
    EncodingFailed(String),
    /// The responder failed; synthesis was skipped
    TranscriptionFailed(String),
    /// The response text was blank; synthesis was skipped
    NothingToSay,
    /// Every synthesized chunk reached the client
    Relayed,
    /// Synthesis failed to start or broke off mid-stream
    SynthesisFailed(String),
}

impl fmt::Display for ConversationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationOutcome::NoAudio => f.write_str("no-audio"),
            ConversationOutcome::EncodingFailed(e) => write!(f, "encoding-failed: {}", e),
            ConversationOutcome::TranscriptionFailed(e) => write!(f, "transcription-failed: {}", e),
            ConversationOutcome::NothingToSay => f.write_str("nothing-to-say"),
            ConversationOutcome::Relayed => f.write_str("relayed"),
            ConversationOutcome::SynthesisFailed(e) => write!(f, "synthesis-failed: {}", e),
        }
    }
}

/// What one conversation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationReport {
    pub outcome: ConversationOutcome,
    pub response_text: Option<String>,
    pub chunks_relayed: usize,
    pub bytes_relayed: u64,
}

impl ConversationReport {
    fn new(outcome: ConversationOutcome) -> Self {
        Self {
            outcome,
            response_text: None,
            chunks_relayed: 0,
            bytes_relayed: 0,
        }
    }
}

/// Drives one request/response cycle: recording -> WAV -> response text ->
/// synthesized speech written back to the client
#[derive(Clone)]
pub struct Orchestrator {
    responder: Arc<dyn Responder>,
    synthesizer: Arc<dyn Synthesizer>,
    prompt: String,
}

impl Orchestrator {
    pub fn new(
        responder: Arc<dyn Responder>,
        synthesizer: Arc<dyn Synthesizer>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            responder,
            synthesizer,
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Run the conversation for a terminated session.
    ///
    /// Collaborator failures end the conversation and are reported in the
    /// outcome. `Err` is reserved for client write failures and misuse of
    /// the session state machine.
    pub async fn run<W>(
        &self,
        session: &mut RecordingSession,
        client: &mut W,
    ) -> Result<ConversationReport>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let Some(audio) = session.take_recording()? else {
            info!(session = %session.id(), "No audio data received to process");
            session.advance(Phase::Empty)?;
            session.advance(Phase::Done)?;
            return Ok(ConversationReport::new(ConversationOutcome::NoAudio));
        };

        session.advance(Phase::Encoding)?;
        info!(
            session = %session.id(),
            "Processing {} bytes ({:.2}s) of audio",
            audio.len(),
            session.format().duration_secs(audio.len())
        );

        let container = match WavContainer::encode(&audio, session.format()) {
            Ok(container) => container,
            Err(e) => {
                error!(session = %session.id(), "Could not encode recording: {:#}", e);
                session.advance(Phase::Done)?;
                return Ok(ConversationReport::new(ConversationOutcome::EncodingFailed(
                    format!("{:#}", e),
                )));
            }
        };
        drop(audio);

        session.advance(Phase::Transcribing)?;
        let text = match self.responder.respond(&container, &self.prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!(
                    session = %session.id(),
                    "{} failed to respond: {:#}",
                    self.responder.name(),
                    e
                );
                session.advance(Phase::Done)?;
                return Ok(ConversationReport::new(
                    ConversationOutcome::TranscriptionFailed(format!("{:#}", e)),
                ));
            }
        };
        info!(session = %session.id(), "{} response: {}", self.responder.name(), text);

        if text.trim().is_empty() {
            info!(session = %session.id(), "No text to synthesize");
            session.advance(Phase::SynthIdle)?;
            session.advance(Phase::Done)?;
            let mut report = ConversationReport::new(ConversationOutcome::NothingToSay);
            report.response_text = Some(text);
            return Ok(report);
        }

        session.advance(Phase::Synthesizing)?;
        let mut report = self.relay(session.id(), &text, client).await?;
        report.response_text = Some(text);
        session.advance(Phase::Done)?;

        Ok(report)
    }

    /// Forward synthesized chunks as they arrive, one at a time
    async fn relay<W>(&self, session_id: &str, text: &str, client: &mut W) -> Result<ConversationReport>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut report = ConversationReport::new(ConversationOutcome::Relayed);

        let mut stream = match self.synthesizer.synthesize(text).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(
                    session = %session_id,
                    "{} could not start synthesis: {:#}",
                    self.synthesizer.name(),
                    e
                );
                report.outcome = ConversationOutcome::SynthesisFailed(format!("{:#}", e));
                return Ok(report);
            }
        };

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    error!(
                        session = %session_id,
                        "{} stream failed after {} chunks: {:#}",
                        self.synthesizer.name(),
                        report.chunks_relayed,
                        e
                    );
                    report.outcome = ConversationOutcome::SynthesisFailed(format!("{:#}", e));
                    break;
                }
            };

            if chunk.is_empty() {
                continue;
            }

            client
                .write_all(&chunk)
                .await
                .context("Failed to send audio chunk to client")?;
            client.flush().await.context("Failed to flush client socket")?;

            report.chunks_relayed += 1;
            report.bytes_relayed += chunk.len() as u64;
            debug!(session = %session_id, "Sent chunk: {} bytes", chunk.len());
        }

        info!(
            session = %session_id,
            "Finished streaming. Total bytes sent: {}",
            report.bytes_relayed
        );

        Ok(report)
    }
}
