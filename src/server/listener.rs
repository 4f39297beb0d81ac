use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpListener, TcpSocket};
use tracing::{info, warn};

use crate::config::Config;
use crate::conversation::Orchestrator;
use crate::session::SessionConfig;

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Where to listen and how to read each connection
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// `host:port` to bind
    pub address: String,

    /// Listen backlog
    pub backlog: u32,

    pub session: SessionConfig,
}

impl ServerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            address: config.service.tcp.address(),
            backlog: config.service.tcp.backlog,
            session: SessionConfig::from(&config.audio),
        }
    }
}

/// Owns the listening socket and serves one device conversation at a time
pub struct RelayServer {
    pub(super) listener: TcpListener,
    pub(super) session_config: SessionConfig,
    pub(super) orchestrator: Orchestrator,
}

impl RelayServer {
    pub async fn bind(settings: ServerSettings, orchestrator: Orchestrator) -> Result<Self> {
        let addr = lookup_host(&settings.address)
            .await
            .with_context(|| format!("Failed to resolve {}", settings.address))?
            .next()
            .with_context(|| format!("No address found for {}", settings.address))?;

        let listener = listen(addr, settings.backlog)
            .with_context(|| format!("Failed to listen on {}", addr))?;

        info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            session_config: settings.session,
            orchestrator,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve connections forever
    pub async fn serve(self) -> Result<()> {
        self.serve_until(std::future::pending()).await
    }

    /// Accept and serve connections until `shutdown` resolves.
    ///
    /// Shutdown is only observed between sessions; a running session is
    /// always finished first.
    pub async fn serve_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            info!("Waiting for a new connection for a single conversation...");

            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = &mut shutdown => {
                    info!("Shutting down");
                    return Ok(());
                }
            };

            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Accept error: {}", e);
                    // Errors like EMFILE repeat until resources free up
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };

            match self.handle_connection(stream, peer).await {
                Ok(stats) => info!(
                    session = %stats.session_id,
                    peer = %stats.peer,
                    termination = ?stats.termination,
                    audio_bytes = stats.audio_bytes,
                    bytes_relayed = stats.bytes_relayed,
                    outcome = stats.outcome.as_deref().unwrap_or("none"),
                    "Response sent. Connection with {} closed. Ready for next.",
                    peer
                ),
                Err(e) => warn!("Session with {} aborted: {:#}", peer, e),
            }
        }
    }
}

fn listen(addr: SocketAddr, backlog: u32) -> Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    Ok(socket.listen(backlog)?)
}
