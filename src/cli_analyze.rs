//! Terminal pipeline runner: analyze one SoundCloud URL, or search and rank
//! remixes of a song or by an artist, printing readable reports.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use remix_radar::config::{self, AppConfig};
use remix_radar::pipeline::RemixRadarPipeline;
use remix_radar::platforms::build_clients;
use remix_radar::reporting::{format_summary_table, format_track_report};

#[derive(Parser, Debug)]
#[command(name = "cli-analyze", about = "Analyze remix opportunities from the terminal")]
struct CliArgs {
    /// SoundCloud permalink URL to analyze.
    pub url: Option<String>,

    /// Search for remixes of this song instead of analyzing one URL.
    #[clap(long)]
    pub song: Option<String>,

    /// Original artist name (filters song search, or searches by artist
    /// when no song is given).
    #[clap(long)]
    pub artist: Option<String>,

    /// Seed tracks to fetch for searches.
    #[clap(long, default_value_t = 10)]
    pub limit: usize,

    /// Path to TOML configuration file.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Print raw JSON instead of formatted tables.
    #[clap(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(config::FileConfig::load(path)?),
        None => None,
    };
    let app_config = AppConfig::resolve(&config::CliConfig::default(), file_config);

    let clients = build_clients(&app_config)?;
    let pipeline = Arc::new(RemixRadarPipeline::new(
        clients,
        app_config.scoring.clone(),
        app_config.resolver.clone(),
        app_config.revenue.clone(),
    ));

    if let Some(url) = &cli_args.url {
        let report = pipeline.analyze_url(url).await?;
        if cli_args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", format_track_report(&report));
        }
        return Ok(());
    }

    let reports = if let Some(song) = &cli_args.song {
        pipeline
            .search_song_remixes(song, cli_args.artist.as_deref(), cli_args.limit, None)
            .await
    } else if let Some(artist) = &cli_args.artist {
        pipeline.search_artist_remixes(artist, cli_args.limit).await
    } else {
        bail!("Provide a SoundCloud URL, or --song/--artist to search");
    };

    if reports.is_empty() {
        eprintln!("No remixes found.");
        return Ok(());
    }

    if cli_args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{}", format_summary_table(&reports));
        if let Some(top) = reports.first() {
            println!();
            println!("{}", format_track_report(top));
        }
    }
    Ok(())
}
