use serde::Serialize;
use std::fmt;

/// How the recording part of a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    /// Still receiving audio
    Collecting,
    /// Client sent the end-of-recording marker
    Marker,
    /// Client closed its side without sending the marker
    Disconnect,
}

impl Termination {
    pub fn is_terminated(self) -> bool {
        !matches!(self, Termination::Collecting)
    }
}

/// Conversation state machine for one session
///
/// ```text
/// idle -> collecting -> empty --------------------------------> done
///                    -> encoding -> transcribing -> synth-idle -> done
///                                                -> synthesizing -> done
/// ```
/// Encoding and transcription failures jump straight to `done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Idle,
    Collecting,
    Empty,
    Encoding,
    Transcribing,
    SynthIdle,
    Synthesizing,
    Done,
}

impl Phase {
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;

        matches!(
            (self, next),
            (Idle, Collecting)
                | (Collecting, Empty)
                | (Collecting, Encoding)
                | (Empty, Done)
                | (Encoding, Transcribing)
                | (Encoding, Done)
                | (Transcribing, SynthIdle)
                | (Transcribing, Synthesizing)
                | (Transcribing, Done)
                | (SynthIdle, Done)
                | (Synthesizing, Done)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Collecting => "collecting",
            Phase::Empty => "empty",
            Phase::Encoding => "encoding",
            Phase::Transcribing => "transcribing",
            Phase::SynthIdle => "synth-idle",
            Phase::Synthesizing => "synthesizing",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
