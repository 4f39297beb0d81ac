mod orchestrator;

pub use orchestrator::{ConversationOutcome, ConversationReport, Orchestrator};
