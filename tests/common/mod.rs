// Scripted collaborators and helpers shared by the integration tests

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use voice_relay::{
    Orchestrator, RelayServer, Responder, ServerSettings, SessionConfig, SynthesisStream,
    Synthesizer, WavContainer,
};

pub const MARKER: &[u8] = b"END_RECORDING_SIGNAL";
pub const PROMPT: &str = "You are a helpful assistant. Provide a concise answer to the following audio.";

/// Responder that returns a fixed reply (or error) and records what it was sent
pub struct ScriptedResponder {
    reply: Result<String, String>,
    calls: AtomicUsize,
    received: Mutex<Vec<Vec<u8>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedResponder {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self::new(Ok(text.to_string())))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self::new(Err(message.to_string())))
    }

    fn new(reply: Result<String, String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// WAV containers received, in call order
    pub fn received(&self) -> Vec<Vec<u8>> {
        self.received.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Responder for ScriptedResponder {
    async fn respond(&self, audio: &WavContainer, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(audio.as_bytes().to_vec());
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(|e| anyhow!(e))
    }

    fn name(&self) -> &str {
        "scripted-responder"
    }
}

/// One step of a scripted synthesis stream
#[derive(Clone)]
pub enum Step {
    Chunk(&'static [u8]),
    Fail(&'static str),
}

/// Synthesizer that replays a fixed list of chunks and failures
pub struct ScriptedSynthesizer {
    steps: Vec<Step>,
    fail_to_start: bool,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl ScriptedSynthesizer {
    pub fn yielding(chunks: &[&'static [u8]]) -> Arc<Self> {
        Self::scripted(chunks.iter().map(|c| Step::Chunk(*c)).collect())
    }

    pub fn scripted(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps,
            fail_to_start: false,
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            steps: Vec::new(),
            fail_to_start: true,
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Synthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SynthesisStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());

        if self.fail_to_start {
            return Err(anyhow!("synthesis service unavailable"));
        }

        let items: Vec<Result<Vec<u8>>> = self
            .steps
            .iter()
            .map(|step| match step {
                Step::Chunk(bytes) => Ok(bytes.to_vec()),
                Step::Fail(message) => Err(anyhow!(*message)),
            })
            .collect();

        Ok(stream::iter(items).boxed())
    }

    fn name(&self) -> &str {
        "scripted-synthesizer"
    }
}

pub fn orchestrator(
    responder: &Arc<ScriptedResponder>,
    synthesizer: &Arc<ScriptedSynthesizer>,
) -> Orchestrator {
    Orchestrator::new(responder.clone(), synthesizer.clone(), PROMPT)
}

/// Bind a relay server on an ephemeral loopback port and serve in the background
pub async fn spawn_server(
    orchestrator: Orchestrator,
) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
    let settings = ServerSettings {
        address: "127.0.0.1:0".to_string(),
        backlog: 1,
        session: SessionConfig::default(),
    };

    let server = RelayServer::bind(settings, orchestrator).await?;
    let addr = server.local_addr()?;
    let handle = tokio::spawn(server.serve());
    Ok((addr, handle))
}

pub fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}
