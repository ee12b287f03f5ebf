use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use remix_radar::config::{self, AppConfig};
use remix_radar::pipeline::RemixRadarPipeline;
use remix_radar::platforms::build_clients;
use remix_radar::server::{run_server, AppState};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !path.exists() {
        return Err(format!("File does not exist: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
#[command(name = "remix-radar", about = "Remix licensing opportunity radar")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI
    /// arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config = config::CliConfig {
        port: cli_args.port,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config);

    for check in app_config.credential_checks() {
        if check.present {
            info!("Credential {} loaded", check.name);
        } else {
            warn!("Credential {} missing, dependent enrichment disabled", check.name);
        }
    }

    let clients = build_clients(&app_config)?;
    let pipeline = Arc::new(RemixRadarPipeline::new(
        clients,
        app_config.scoring.clone(),
        app_config.resolver.clone(),
        app_config.revenue.clone(),
    ));
    let state = AppState {
        pipeline,
        search: app_config.search.clone(),
        credentials: app_config.credential_checks(),
    };

    info!("Ready to serve at port {}!", app_config.port);

    let shutdown_token = CancellationToken::new();
    tokio::select! {
        result = run_server(state, app_config.port, shutdown_token.child_token()) => {
            info!("HTTP server stopped: {:?}", result);
            result
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            shutdown_token.cancel();
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(())
        }
    }
}
