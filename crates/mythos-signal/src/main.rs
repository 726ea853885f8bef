//! mythos-signal binary: load config, start logging, serve.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use mythos_common::MythosError;
use mythos_config::{validation, RelayServerConfig};
use mythos_signal::{serve, Hub, RelaySettings, ServeOptions};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "mythos-signal", version, about = "WebSocket signaling relay for Mythos sessions")]
struct Args {
    /// Config file path override.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter override (e.g. "mythos_signal=debug").
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut RelayServerConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mythos-signal: {e}");
            return ExitCode::FAILURE;
        }
    };

    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.directive());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| directive.into()),
        )
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "mythos-signal stopped");
            ExitCode::FAILURE
        }
    }
}

/// Read the config file, apply CLI overrides, then validate the result.
fn load(args: &Args) -> Result<RelayServerConfig, MythosError> {
    let mut config = mythos_config::load_optional(args.config.as_deref())?;
    args.apply(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

async fn run(config: RelayServerConfig) -> mythos_common::Result<()> {
    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("mythos-signal v{} listening on ws://{}", env!("CARGO_PKG_VERSION"), addr);

    let hub = Hub::new(RelaySettings {
        no_master_message: config.server.no_master_message.clone(),
        relay_trace: config.logging.relay_trace,
    });
    let options = ServeOptions {
        outbox_capacity: config.server.outbox_capacity as usize,
        banner: Arc::from(config.server.banner.as_str()),
    };

    tokio::select! {
        served = serve(listener, hub, options) => {
            served?;
            Ok(())
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown requested");
            Ok(())
        }
    }
}
