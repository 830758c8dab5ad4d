use abdb_scraper::DetailExtractor;
use abdb_store::{pending_work, read_references, write_references, DatasetAppender};
use anyhow::Context;
use futures::{future, stream, StreamExt};

use super::{StageContext, StageSummary};

/// Fetches profile details for every reference not yet in the details file.
///
/// Up to `detail_concurrency` profiles are fetched at once, but results are
/// appended in reference order and every request still waits on the shared
/// throttle.
///
/// # Errors
///
/// Returns an error if the companies file cannot be read or the details
/// file cannot be initialised or appended to.
pub(crate) async fn run_details(ctx: &StageContext<'_>) -> anyhow::Result<StageSummary> {
    let paths = ctx.paths;

    let references = read_references(&paths.companies).with_context(|| {
        format!(
            "failed to read companies file {}; run `abdb enumerate` first",
            paths.companies.display()
        )
    })?;
    let pending = pending_work(references, &paths.details)
        .with_context(|| format!("failed to initialise {}", paths.details.display()))?;
    write_references(&paths.plc, &pending)
        .with_context(|| format!("failed to write {}", paths.plc.display()))?;

    let mut summary = StageSummary {
        pending: pending.len(),
        ..StageSummary::default()
    };
    tracing::info!(pending = pending.len(), "detail stage starting");
    if pending.is_empty() {
        return Ok(summary);
    }

    let extractor = DetailExtractor::new(ctx.fetcher.clone(), ctx.extractor());
    let mut appender = DatasetAppender::open(&paths.details)
        .with_context(|| format!("failed to open {}", paths.details.display()))?;

    let records = stream::iter(&pending)
        .take_while(|_| future::ready(!ctx.cancel.is_cancelled()))
        .map(|reference| extractor.extract_details(reference))
        .buffered(ctx.config.detail_concurrency.max(1));
    let mut records = std::pin::pin!(records);

    while let Some(record) = records.next().await {
        appender
            .append(&record)
            .with_context(|| format!("failed to append to {}", paths.details.display()))?;
        tracing::debug!(name = %record.name, done = appender.appended(), "detail record saved");
    }

    summary.completed = appender.appended();
    summary.cancelled = ctx.cancel.is_cancelled();
    Ok(summary)
}
