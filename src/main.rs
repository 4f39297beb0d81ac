use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_relay::{
    net, Config, ElevenLabsSynthesizer, GeminiResponder, Orchestrator, RelayServer, ServerSettings,
};

#[derive(Parser)]
#[command(name = "voice-relay")]
#[command(about = "Relay device audio to a voice assistant and stream the spoken reply back")]
struct Args {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/voice-relay")]
    config: String,

    /// Override service.tcp.host
    #[arg(long)]
    host: Option<String>,

    /// Override service.tcp.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "voice_relay=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut cfg = Config::load(&args.config)?;
    if let Some(host) = args.host {
        cfg.service.tcp.host = host;
    }
    if let Some(port) = args.port {
        cfg.service.tcp.port = port;
    }
    cfg.validate()?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!(
        "Audio: {}Hz, {} channel(s), {}-bit PCM",
        cfg.audio.sample_rate,
        cfg.audio.channels,
        cfg.audio.sample_width * 8
    );

    let responder = Arc::new(GeminiResponder::new(&cfg.gemini)?);
    let synthesizer = Arc::new(ElevenLabsSynthesizer::new(&cfg.elevenlabs)?);
    let orchestrator = Orchestrator::new(responder, synthesizer, cfg.gemini.prompt.clone());

    let server = RelayServer::bind(ServerSettings::from_config(&cfg), orchestrator).await?;

    info!(
        "Use this IP in your device firmware: \"{}\" (port {})",
        net::local_ip().await,
        server.local_addr()?.port()
    );

    server
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
}
