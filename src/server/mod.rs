//! TCP relay server
//!
//! One connection at a time: the accept loop awaits each session before it
//! accepts the next one. A failing session is logged and never stops the loop.

mod connection;
mod listener;

pub use listener::{RelayServer, ServerSettings};
