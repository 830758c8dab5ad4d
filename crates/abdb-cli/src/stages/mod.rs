//! Harvest stages: enumeration, detail extraction and contact discovery.
//!
//! Each stage reads the previous stage's file, computes its pending work
//! against its own output file, and appends one record at a time, so any
//! stage can be interrupted and resumed.

mod contacts;
mod details;
mod enumerate;

use std::fmt::Write as _;
use std::sync::Arc;

use abdb_scraper::{AllabolagExtractor, Fetcher, PageFieldExtractor};
use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::paths::StagePaths;

pub(crate) use contacts::run_contacts;
pub(crate) use details::run_details;
pub(crate) use enumerate::run_enumerate;

/// Everything a stage needs. The fetcher is built once so every stage of
/// a run shares the same request throttle.
pub(crate) struct StageContext<'a> {
    pub config: &'a abdb_core::AppConfig,
    pub paths: &'a StagePaths,
    pub fetcher: Fetcher,
    pub cancel: CancellationToken,
}

impl<'a> StageContext<'a> {
    pub(crate) fn new(
        config: &'a abdb_core::AppConfig,
        paths: &'a StagePaths,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        let fetcher = Fetcher::from_config(config).context("failed to build HTTP client")?;
        Ok(Self {
            config,
            paths,
            fetcher,
            cancel,
        })
    }

    fn extractor(&self) -> Arc<dyn PageFieldExtractor> {
        Arc::new(AllabolagExtractor::new(&self.config.harvest.base_url))
    }
}

/// Counts reported by a stage once it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StageSummary {
    /// Work items the stage started with.
    pub pending: usize,
    /// Records written by this run.
    pub completed: usize,
    /// The stage reused an existing output file instead of running.
    pub cached: bool,
    pub cancelled: bool,
    pub websites_found: usize,
    pub emails_added: usize,
}

impl StageSummary {
    pub(crate) fn print(&self, stage: &str) {
        if self.cached {
            println!("{stage}: reused existing output ({} references)", self.completed);
            return;
        }
        let mut line = format!("{stage}: {} of {} completed", self.completed, self.pending);
        if self.websites_found > 0 || self.emails_added > 0 {
            let _ = write!(
                line,
                ", {} websites found, {} emails added",
                self.websites_found, self.emails_added
            );
        }
        if self.cancelled {
            line.push_str(" (interrupted)");
        }
        println!("{line}");
    }
}

/// Enumerate (reusing a cached companies file), fetch details, and
/// optionally discover contacts.
///
/// # Errors
///
/// Returns an error if a stage cannot read its input or write its output.
pub(crate) async fn run_pipeline(
    ctx: &StageContext<'_>,
    with_contacts: bool,
) -> anyhow::Result<()> {
    run_enumerate(ctx, false).await?.print("enumerate");
    if ctx.cancel.is_cancelled() {
        return Ok(());
    }

    run_details(ctx).await?.print("details");
    if !with_contacts || ctx.cancel.is_cancelled() {
        return Ok(());
    }

    run_contacts(ctx).await?.print("contacts");
    Ok(())
}

#[cfg(test)]
#[path = "stages_test.rs"]
mod tests;
