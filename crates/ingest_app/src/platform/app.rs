use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use ingest_core::{ErrorTable, SessionPhase};
use ingest_engine::{HttpJobRepository, SessionRegistry};
use ingest_logging::{ingest_info, ingest_warn};

use super::config::{self, DEFAULT_CONFIG_PATH};
use super::logging::{self, LogDestination};
use super::render;

#[derive(Parser, Debug)]
#[command(name = "ingest_app")]
#[command(about = "Import a recipe from a TikTok, Instagram or YouTube video")]
#[command(version)]
struct Args {
    /// Link to the video
    url: String,

    /// RON config file; defaults apply when it does not exist
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Also write logs to ./ingest.log
    #[arg(long)]
    log_file: bool,

    /// Keep logs off the terminal
    #[arg(short, long)]
    quiet: bool,
}

pub fn run_app() -> Result<()> {
    let args = Args::parse();
    let config = config::load(&args.config)?;

    let level = config.log_level()?;
    match (args.log_file, args.quiet) {
        (true, true) => logging::initialize(LogDestination::File, level),
        (true, false) => logging::initialize(LogDestination::Both, level),
        (false, false) => logging::initialize(LogDestination::Terminal, level),
        (false, true) => {}
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(track_import(&args.url, config))
}

async fn track_import(url: &str, config: config::AppConfig) -> Result<()> {
    let repository = HttpJobRepository::new(config.http_settings())
        .context("failed to build ingestion client")?;
    let registry = SessionRegistry::new(Arc::new(repository), Arc::new(ErrorTable), config.session)
        .context("invalid session settings")?;

    let session = registry.get_or_create();
    if !session.validate_url(url) {
        registry.clear();
        bail!("{}", ingest_core::INVALID_URL_MESSAGE);
    }

    // Let the startup count check settle so the job limit is current.
    session.check_active_job_count().await;

    let mut updates = session.subscribe();
    ingest_info!("Submitting {}", url);
    session.submit(url).await;

    loop {
        let state = updates.borrow_and_update().clone();
        println!("{}", render::status_line(&state, Local::now()));
        if !state.is_loading {
            break;
        }
        if updates.changed().await.is_err() {
            ingest_warn!("Session closed before the import settled");
            break;
        }
    }

    let state = session.state();
    registry.clear();
    println!("{}", render::outcome(&state));
    match state.phase {
        SessionPhase::Completed => Ok(()),
        _ => bail!("import did not complete"),
    }
}
