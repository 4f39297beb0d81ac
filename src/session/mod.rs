//! Recording session management
//!
//! A `RecordingSession` covers one accepted connection:
//! - Scanning reads for the end-of-recording marker
//! - Accumulating the PCM that precedes it
//! - Tracking how the recording ended and which conversation phase it is in
//! - Producing `SessionStats` when the connection closes

mod config;
mod phase;
mod session;
mod stats;

pub use config::SessionConfig;
pub use phase::{Phase, Termination};
pub use session::RecordingSession;
pub use stats::SessionStats;
