mod datasets;
mod paths;
mod stages;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::paths::StagePaths;
use crate::stages::StageContext;

#[derive(Debug, Parser)]
#[command(name = "abdb")]
#[command(about = "Incremental company directory harvester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk the listing pages and write the companies file
    Enumerate {
        /// Re-run enumeration even if the companies file already exists
        #[arg(long)]
        force: bool,
    },
    /// Fetch profile details for companies not yet in the details file
    Details,
    /// Find websites and emails for records not yet in the web file
    Contacts,
    /// Enumerate (unless cached), then fetch details
    Run {
        /// Also run the contact discovery stage
        #[arg(long)]
        with_contacts: bool,
    },
    /// Fold websites and emails from OTHER into MAIN, keyed by registration number
    Merge {
        main: PathBuf,
        other: PathBuf,
        /// Output file (defaults to out/merged.csv under the data directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List records of LEFT whose registration number is missing from RIGHT
    Diff {
        left: PathBuf,
        right: PathBuf,
        /// Also write the differing records to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export SNI industry codes from a record dataset
    Sni {
        input: PathBuf,
        /// Distinct code table (defaults to sni/sni_codes_unique.csv)
        #[arg(long)]
        unique: Option<PathBuf>,
        /// Company to code mapping (defaults to sni/company_sni.csv)
        #[arg(long)]
        mapping: Option<PathBuf>,
    },
    /// Report how many references in ALL are not yet in DONE, without writing anything
    Pending { all: PathBuf, done: PathBuf },
}

/// Cancels the returned token on the first Ctrl-C.
///
/// Stages check the token between entities, so records already in flight
/// are still appended before the stage stops.
fn install_ctrl_c_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; finishing in-flight work before stopping");
            trigger.cancel();
        }
    });
    token
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = abdb_core::load_app_config().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let paths = StagePaths::new(&config.data_dir, &config.harvest.filename_tag());
    let cancel = install_ctrl_c_handler();

    let result = run(cli.command, &config, &paths, cancel).await;
    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "command failed");
    }
    result
}

async fn run(
    command: Commands,
    config: &abdb_core::AppConfig,
    paths: &StagePaths,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    match command {
        Commands::Enumerate { force } => {
            let ctx = StageContext::new(config, paths, cancel)?;
            stages::run_enumerate(&ctx, force).await?.print("enumerate");
        }
        Commands::Details => {
            let ctx = StageContext::new(config, paths, cancel)?;
            stages::run_details(&ctx).await?.print("details");
        }
        Commands::Contacts => {
            let ctx = StageContext::new(config, paths, cancel)?;
            stages::run_contacts(&ctx).await?.print("contacts");
        }
        Commands::Run { with_contacts } => {
            let ctx = StageContext::new(config, paths, cancel)?;
            stages::run_pipeline(&ctx, with_contacts).await?;
        }
        Commands::Merge { main, other, out } => {
            let out = out.unwrap_or_else(|| paths.merged.clone());
            datasets::run_merge(&main, &other, &out)?;
        }
        Commands::Diff { left, right, out } => {
            datasets::run_diff(&left, &right, out.as_deref())?;
        }
        Commands::Sni {
            input,
            unique,
            mapping,
        } => {
            let unique = unique.unwrap_or_else(|| paths.sni_unique.clone());
            let mapping = mapping.unwrap_or_else(|| paths.sni_mapping.clone());
            datasets::run_sni(&input, &unique, &mapping)?;
        }
        Commands::Pending { all, done } => datasets::run_pending(&all, &done)?,
    }
    Ok(())
}
