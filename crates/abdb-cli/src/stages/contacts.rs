use std::sync::Arc;

use abdb_core::{AppConfig, ConfigError, SearchProvider};
use abdb_scraper::{
    BraveSearch, ContactDiscovery, DuckDuckGoSearch, EmailProbe, Fetcher, GoogleCseSearch,
    SearchBackend, WebsiteFinder,
};
use abdb_store::{pending_work, read_records, write_records, DatasetAppender};
use anyhow::Context;

use super::{StageContext, StageSummary};

/// Builds the configured website search backend.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] when the provider needs a
/// credential that is not configured.
pub(super) fn search_backend(
    config: &AppConfig,
    fetcher: &Fetcher,
) -> Result<Arc<dyn SearchBackend>, ConfigError> {
    let api_key = || {
        config
            .search_api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("ABDB_SEARCH_API_KEY".to_owned()))
    };

    let backend: Arc<dyn SearchBackend> = match config.search_provider {
        SearchProvider::Google => {
            let cx = config
                .search_cx
                .clone()
                .ok_or_else(|| ConfigError::MissingEnvVar("ABDB_SEARCH_CX".to_owned()))?;
            Arc::new(GoogleCseSearch::new(fetcher.clone(), api_key()?, cx))
        }
        SearchProvider::Brave => Arc::new(BraveSearch::new(fetcher.clone(), api_key()?)),
        SearchProvider::DuckDuckGo => Arc::new(DuckDuckGoSearch::new(fetcher.clone())),
    };
    Ok(backend)
}

/// Supplements websites and emails for every detail record not yet in the
/// web file.
///
/// # Errors
///
/// Returns an error if the search backend is misconfigured or a stage file
/// cannot be read or written.
pub(crate) async fn run_contacts(ctx: &StageContext<'_>) -> anyhow::Result<StageSummary> {
    let paths = ctx.paths;

    let backend = search_backend(ctx.config, &ctx.fetcher)
        .with_context(|| format!("cannot use search provider {}", ctx.config.search_provider))?;
    let discovery = ContactDiscovery::new(
        WebsiteFinder::new(backend).with_query_suffix(ctx.config.search_query_suffix.clone()),
        EmailProbe::new(ctx.fetcher.clone()),
    );

    let records = read_records(&paths.details).with_context(|| {
        format!(
            "failed to read details file {}; run `abdb details` first",
            paths.details.display()
        )
    })?;
    let pending = pending_work(records, &paths.web)
        .with_context(|| format!("failed to initialise {}", paths.web.display()))?;
    write_records(&paths.plc, &pending)
        .with_context(|| format!("failed to write {}", paths.plc.display()))?;

    let mut summary = StageSummary {
        pending: pending.len(),
        ..StageSummary::default()
    };
    tracing::info!(
        pending = pending.len(),
        provider = %ctx.config.search_provider,
        "contact stage starting"
    );
    if pending.is_empty() {
        return Ok(summary);
    }

    let mut appender = DatasetAppender::open(&paths.web)
        .with_context(|| format!("failed to open {}", paths.web.display()))?;

    for mut record in pending {
        if ctx.cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }
        let outcome = discovery.supplement(&mut record).await;
        summary.websites_found += usize::from(outcome.website_found);
        summary.emails_added += outcome.emails_added;

        appender
            .append(&record)
            .with_context(|| format!("failed to append to {}", paths.web.display()))?;
        tracing::debug!(
            name = %record.name,
            website = record.website_value().unwrap_or(""),
            emails = record.emails.len(),
            "contact record saved"
        );
    }

    summary.completed = appender.appended();
    Ok(summary)
}
