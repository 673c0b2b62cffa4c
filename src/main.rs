use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tutor_gateway::{ApiServerBuilder, ChatRelay, Config, OpenAiClient, PresenceTracker};

/// Tutor - chat relay and presence gateway for a language-learning front end
#[derive(Parser)]
#[command(name = "tutor", version, about)]
struct Cli {
    /// Port to listen on (overrides `TUTOR_PORT`/`PORT` and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory with the front-end build to serve
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity, RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "info,tutor_gateway=info",
        1 => "info,tutor_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.static_dir.is_some() {
        config.server.static_dir = cli.static_dir;
    }
    tracing::debug!(?config, "loaded configuration");

    let backend = OpenAiClient::new(config.upstream.api_url.clone(), config.upstream.timeout)?;

    tracing::info!(
        port = config.server.port,
        model = %config.upstream.model,
        api_url = backend.api_url(),
        "starting tutor gateway"
    );

    let relay = ChatRelay::new(
        Arc::new(backend),
        config.upstream.api_key.clone(),
        config.relay_settings(),
    );

    let presence = PresenceTracker::new(config.presence.timeout, config.presence.sweep_interval);
    presence.start().await;

    let server = ApiServerBuilder::new(presence.clone(), relay, config.server.port)
        .static_dir(config.server.static_dir.clone())
        .chat_counts_as_heartbeat(config.chat.counts_as_heartbeat)
        .build();

    let result = server.run(shutdown_signal()).await;

    presence.stop().await;
    tracing::info!("tutor gateway stopped");

    result.map_err(Into::into)
}

/// Resolve when the process receives Ctrl-C
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown requested");
    }
}
