//! worksift - Main entry point
//!
//! Command-line driver for the pipeline stages. Each subcommand runs one
//! stage against the files of the previous one, so a full run is
//! `collect`, `process`, `build` in order; `strict` re-filters an existing
//! enhanced dataset at a different threshold without touching the network.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use worksift::openalex::OpenAlexClient;
use worksift::pipeline;
use worksift_common::config::Settings;
use worksift_common::models::QuartileThreshold;

/// Command-line arguments for worksift
#[derive(Parser, Debug)]
#[command(name = "worksift")]
#[command(about = "Builds a quality-gated corpus of EU AI-in-education publications")]
#[command(version)]
struct Args {
    /// Configuration file (default: WORKSIFT_CONFIG, then ./worksift.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data root directory, overriding the configured one
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect publications into a raw snapshot
    Collect,
    /// Flatten the latest snapshot into the raw work table
    Process,
    /// Enrich the raw table and write the enhanced and strict datasets
    Build {
        /// Quartile threshold of the strict dataset
        #[arg(short, long, value_enum, default_value_t = QuartileThreshold::Q3)]
        threshold: QuartileThreshold,
    },
    /// Re-filter an existing enhanced dataset at a threshold
    Strict {
        /// Quartile threshold of the strict dataset
        #[arg(short, long, value_enum, default_value_t = QuartileThreshold::Q3)]
        threshold: QuartileThreshold,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "worksift=debug,worksift_common=debug"
    } else {
        "worksift=info,worksift_common=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load(args.config.as_deref(), args.data_dir.as_deref());
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        profile = env!("BUILD_PROFILE"),
        data_dir = %settings.data_dir.display(),
        "Starting worksift"
    );

    match args.command {
        Command::Collect => {
            let client = OpenAlexClient::with_base_url(
                &settings.openalex_base_url,
                settings.request_timeout(),
                settings.mailto.clone(),
            )
            .context("Failed to build OpenAlex client")?;
            let path = pipeline::collect_works(&settings, &client).await?;
            info!(path = %path.display(), "Collection complete");
        }
        Command::Process => {
            pipeline::process_latest_snapshot(&settings)?;
        }
        Command::Build { threshold } => {
            pipeline::build_datasets(&settings, threshold).await?;
        }
        Command::Strict { threshold } => {
            pipeline::rebuild_strict(&settings, threshold)?;
        }
    }

    Ok(())
}
