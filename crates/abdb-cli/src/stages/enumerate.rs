use abdb_scraper::ListingEnumerator;
use abdb_store::{read_references, write_references};
use anyhow::Context;
use futures::{future, StreamExt};

use super::{StageContext, StageSummary};

/// Walks the listing pages and writes the companies file.
///
/// An existing companies file is reused unless `force` is set. When the run
/// is interrupted nothing is written, so a partial listing is never cached.
///
/// # Errors
///
/// Returns an error if the cached file cannot be read or the companies
/// file cannot be written.
pub(crate) async fn run_enumerate(
    ctx: &StageContext<'_>,
    force: bool,
) -> anyhow::Result<StageSummary> {
    let path = &ctx.paths.companies;

    if path.exists() && !force {
        let cached = read_references(path)
            .with_context(|| format!("failed to read companies file {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            references = cached.len(),
            "companies file exists; skipping enumeration"
        );
        return Ok(StageSummary {
            completed: cached.len(),
            cached: true,
            ..StageSummary::default()
        });
    }

    let enumerator = ListingEnumerator::new(
        ctx.fetcher.clone(),
        ctx.extractor(),
        ctx.config.harvest.clone(),
    );
    let references: Vec<_> = enumerator
        .enumerate()
        .take_while(|_| future::ready(!ctx.cancel.is_cancelled()))
        .collect()
        .await;

    if ctx.cancel.is_cancelled() {
        tracing::warn!(
            references = references.len(),
            "enumeration interrupted; companies file not written"
        );
        return Ok(StageSummary {
            pending: references.len(),
            cancelled: true,
            ..StageSummary::default()
        });
    }

    write_references(path, &references)
        .with_context(|| format!("failed to write companies file {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        references = references.len(),
        "enumeration complete"
    );

    Ok(StageSummary {
        pending: references.len(),
        completed: references.len(),
        ..StageSummary::default()
    })
}
