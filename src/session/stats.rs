use super::phase::{Phase, Termination};
use crate::conversation::ConversationReport;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of one connection, logged when it closes
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: String,

    /// Remote address of the device
    pub peer: String,

    /// When the connection was accepted
    pub started_at: DateTime<Utc>,

    /// Connection lifetime so far, in seconds
    pub duration_secs: f64,

    /// Raw bytes read, marker included
    pub bytes_received: usize,

    /// Number of socket reads
    pub reads: usize,

    /// Recorded PCM bytes
    pub audio_bytes: usize,

    /// Recorded audio length in seconds
    pub audio_secs: f64,

    /// Bytes dropped after the marker
    pub discarded_bytes: usize,

    pub termination: Termination,

    /// Every phase the conversation went through
    pub phases: Vec<Phase>,

    /// Conversation outcome, if the conversation ran
    pub outcome: Option<String>,

    pub chunks_relayed: usize,
    pub bytes_relayed: u64,
}

impl SessionStats {
    pub fn record_conversation(&mut self, report: &ConversationReport) {
        self.outcome = Some(report.outcome.to_string());
        self.chunks_relayed = report.chunks_relayed;
        self.bytes_relayed = report.bytes_relayed;
    }
}
