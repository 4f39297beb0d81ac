use super::config::SessionConfig;
use super::phase::{Phase, Termination};
use super::stats::SessionStats;
use crate::audio::{AudioAccumulator, AudioFormat, Detection, FrameDetector};
use anyhow::{bail, ensure, Context, Result};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use tracing::{debug, info};

/// One accepted connection, from first byte to close
///
/// Owns the marker detector, the audio buffer and the conversation phase.
/// Termination happens exactly once, either by marker or by disconnect; the
/// recording can only be taken after that.
pub struct RecordingSession {
    /// Unique session identifier
    id: String,

    /// Remote end of the connection
    peer: SocketAddr,

    /// When the connection was accepted
    started_at: DateTime<Utc>,

    format: AudioFormat,
    detector: FrameDetector,

    /// `None` once the recording has been handed to the orchestrator
    accumulator: Option<AudioAccumulator>,

    /// Raw bytes read from the socket, marker included
    bytes_received: usize,
    reads: usize,

    /// Bytes that followed the marker in its read
    discarded_bytes: usize,

    audio_bytes: usize,
    termination: Termination,
    phases: Vec<Phase>,
}

impl RecordingSession {
    pub fn new(peer: SocketAddr, config: &SessionConfig) -> Result<Self> {
        let detector = FrameDetector::new(config.end_marker.clone())?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            peer,
            started_at: Utc::now(),
            format: config.format,
            detector,
            accumulator: Some(AudioAccumulator::new()),
            bytes_received: 0,
            reads: 0,
            discarded_bytes: 0,
            audio_bytes: 0,
            termination: Termination::Collecting,
            phases: vec![Phase::Idle],
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn phase(&self) -> Phase {
        // phases always starts with Idle
        self.phases.last().copied().unwrap_or(Phase::Idle)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Audio accumulated so far (or in total, once terminated)
    pub fn audio_len(&self) -> usize {
        match &self.accumulator {
            Some(acc) if !self.termination.is_terminated() => acc.len() + self.detector.pending(),
            Some(acc) => acc.len(),
            None => self.audio_bytes,
        }
    }

    /// Feed one socket read. Returns the termination state afterwards.
    pub fn ingest(&mut self, chunk: &[u8]) -> Result<Termination> {
        self.ensure_collecting()?;

        self.bytes_received += chunk.len();
        self.reads += 1;

        let accumulator = self
            .accumulator
            .as_mut()
            .context("Recording buffer missing while collecting")?;

        match self.detector.feed(chunk) {
            Detection::Audio(audio) => {
                accumulator.append(&audio);
                debug!(
                    session = %self.id,
                    "Receiving audio... buffer size: {} bytes",
                    accumulator.len()
                );
            }
            Detection::Marker { audio, discarded } => {
                accumulator.append(&audio);
                self.discarded_bytes += discarded;
                info!(session = %self.id, "End of recording signal received");
                if discarded > 0 {
                    debug!(
                        session = %self.id,
                        "Discarded {} bytes after end-of-recording marker",
                        discarded
                    );
                }
                self.terminate(Termination::Marker)?;
            }
        }

        Ok(self.termination)
    }

    /// The peer closed its side without sending the marker
    pub fn end_of_stream(&mut self) -> Result<()> {
        self.ensure_collecting()?;

        let tail = self.detector.finish();
        self.accumulator
            .as_mut()
            .context("Recording buffer missing while collecting")?
            .append(&tail);

        info!(session = %self.id, "Peer closed connection before end-of-recording marker");
        self.terminate(Termination::Disconnect)
    }

    /// Take the recorded PCM. `None` means nothing was captured.
    pub fn take_recording(&mut self) -> Result<Option<Vec<u8>>> {
        ensure!(
            self.termination.is_terminated(),
            "Recording requested while session {} is still collecting",
            self.id
        );

        let accumulator = self
            .accumulator
            .take()
            .with_context(|| format!("Recording for session {} already taken", self.id))?;

        Ok(accumulator.finish())
    }

    /// Move the conversation state machine forward
    pub fn advance(&mut self, next: Phase) -> Result<()> {
        let current = self.phase();
        if !current.can_advance_to(next) {
            bail!(
                "Invalid phase transition for session {}: {} -> {}",
                self.id,
                current,
                next
            );
        }

        debug!(session = %self.id, "Phase {} -> {}", current, next);
        self.phases.push(next);
        Ok(())
    }

    pub fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);
        let audio_bytes = self.audio_len();

        SessionStats {
            session_id: self.id.clone(),
            peer: self.peer.to_string(),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            bytes_received: self.bytes_received,
            reads: self.reads,
            audio_bytes,
            audio_secs: self.format.duration_secs(audio_bytes),
            discarded_bytes: self.discarded_bytes,
            termination: self.termination,
            phases: self.phases.clone(),
            outcome: None,
            chunks_relayed: 0,
            bytes_relayed: 0,
        }
    }

    fn ensure_collecting(&mut self) -> Result<()> {
        ensure!(
            !self.termination.is_terminated(),
            "Session {} already terminated ({:?})",
            self.id,
            self.termination
        );

        if self.phase() == Phase::Idle {
            self.advance(Phase::Collecting)?;
        }
        Ok(())
    }

    fn terminate(&mut self, termination: Termination) -> Result<()> {
        ensure!(
            !self.termination.is_terminated(),
            "Session {} terminated twice",
            self.id
        );

        self.termination = termination;
        self.audio_bytes = self.accumulator.as_ref().map_or(0, AudioAccumulator::len);
        Ok(())
    }
}
