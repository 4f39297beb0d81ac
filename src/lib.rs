pub mod assistant;
pub mod audio;
pub mod config;
pub mod conversation;
pub mod net;
pub mod server;
pub mod session;

pub use assistant::{ElevenLabsSynthesizer, GeminiResponder, Responder, SynthesisStream, Synthesizer};
pub use audio::{AudioAccumulator, AudioFormat, Detection, FrameDetector, WavContainer};
pub use config::Config;
pub use conversation::{ConversationOutcome, ConversationReport, Orchestrator};
pub use server::{RelayServer, ServerSettings};
pub use session::{Phase, RecordingSession, SessionConfig, SessionStats, Termination};
