use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::listener::RelayServer;
use crate::session::{RecordingSession, SessionStats, Termination};

impl RelayServer {
    /// Run one session to completion on `stream`.
    ///
    /// The stream is closed when this returns, on success or error.
    pub async fn handle_connection(
        &self,
        mut stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<SessionStats> {
        info!("Connected by {}. Receiving audio...", peer);

        let mut session = RecordingSession::new(peer, &self.session_config)?;
        receive_recording(&mut stream, &mut session, self.session_config.chunk_size).await?;

        let report = self.orchestrator.run(&mut session, &mut stream).await?;

        if let Err(e) = stream.shutdown().await {
            debug!("Shutdown of {} failed: {}", peer, e);
        }

        let mut stats = session.stats();
        stats.record_conversation(&report);
        Ok(stats)
    }
}

/// Read until the marker arrives or the peer closes its side
async fn receive_recording(
    stream: &mut TcpStream,
    session: &mut RecordingSession,
    chunk_size: usize,
) -> Result<()> {
    let mut buf = vec![0u8; chunk_size.max(1)];

    loop {
        let read = stream
            .read(&mut buf)
            .await
            .context("Socket error during receive")?;

        if read == 0 {
            session.end_of_stream()?;
            return Ok(());
        }

        if session.ingest(&buf[..read])? != Termination::Collecting {
            return Ok(());
        }
    }
}
