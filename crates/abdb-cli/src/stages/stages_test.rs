use std::path::Path;
use std::time::Duration;

use abdb_core::{
    AppConfig, ConfigError, EntityRecord, EntityReference, HarvestConfig, SearchProvider,
};
use abdb_scraper::SearchBackend;
use abdb_store::{read_records, read_references, write_references, DatasetAppender};
use wiremock::matchers::{method, path, path_regex, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::contacts::search_backend;
use super::*;

fn test_config(base_url: &str, data_dir: &Path) -> AppConfig {
    AppConfig {
        harvest: HarvestConfig {
            base_url: base_url.to_owned(),
            page_limit: 5,
            request_delay: Duration::ZERO,
            ..HarvestConfig::default()
        },
        log_level: "info".to_owned(),
        data_dir: data_dir.to_path_buf(),
        request_timeout_secs: 5,
        user_agent: "abdb-test/0.1".to_owned(),
        max_retries: 0,
        retry_backoff_base_secs: 0,
        detail_concurrency: 2,
        search_provider: SearchProvider::DuckDuckGo,
        search_api_key: None,
        search_cx: None,
        search_query_suffix: String::new(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body.to_owned())
}

fn listing_page(cards: &[(&str, &str)]) -> String {
    let cards: String = cards
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<div class="SegmentationSearchResultCard-card"><a href="{href}">{name}</a></div>"#
            )
        })
        .collect();
    format!("<html><body>{cards}</body></html>")
}

fn profile_refs(base_url: &str, companies: &[(&str, &str)]) -> Vec<EntityReference> {
    companies
        .iter()
        .map(|(name, org)| EntityReference::new(*name, format!("{base_url}/foretag/x/-/{org}")))
        .collect()
}

// ---------------------------------------------------------------------------
// Enumerate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enumerate_writes_companies_then_reuses_them() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/segmentering"))
        .and(query_param_is_missing("page"))
        .respond_with(html(&listing_page(&[
            ("Acme AB", "/foretag/acme-ab/orebro/-/5561234567"),
            ("Beta AB", "/foretag/beta-ab/orebro/-/5569876543"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/segmentering"))
        .and(query_param("page", "2"))
        .respond_with(html(&listing_page(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), dir.path());
    let paths = StagePaths::new(dir.path(), &config.harvest.filename_tag());
    let ctx = StageContext::new(&config, &paths, CancellationToken::new()).unwrap();

    let first = run_enumerate(&ctx, false).await.unwrap();
    assert_eq!(first.completed, 2);
    assert!(!first.cached);

    let written = read_references(&paths.companies).unwrap();
    assert_eq!(written[0].name, "Acme AB");
    assert_eq!(
        written[1].profile_url,
        format!("{}/foretag/beta-ab/orebro/-/5569876543", server.uri())
    );

    let second = run_enumerate(&ctx, false).await.unwrap();
    assert!(second.cached);
    assert_eq!(second.completed, 2);
}

#[tokio::test]
async fn interrupted_enumeration_writes_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), dir.path());
    let paths = StagePaths::new(dir.path(), &config.harvest.filename_tag());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let ctx = StageContext::new(&config, &paths, cancel).unwrap();

    let summary = run_enumerate(&ctx, true).await.unwrap();

    assert!(summary.cancelled);
    assert!(!paths.companies.exists());
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn details_stage_resumes_and_appends_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/foretag/"))
        .respond_with(html("<html><body><h1>Profile</h1></body></html>"))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), dir.path());
    let paths = StagePaths::new(dir.path(), &config.harvest.filename_tag());
    let refs = profile_refs(
        &server.uri(),
        &[
            ("Acme AB", "5561234567"),
            ("Beta AB", "5569876543"),
            ("Gamma AB", "5560000001"),
        ],
    );
    write_references(&paths.companies, &refs).unwrap();

    let mut appender = DatasetAppender::open(&paths.details).unwrap();
    appender.append(&EntityRecord::from_reference(&refs[1])).unwrap();
    drop(appender);

    let ctx = StageContext::new(&config, &paths, CancellationToken::new()).unwrap();
    let summary = run_details(&ctx).await.unwrap();

    assert_eq!(summary.pending, 2);
    assert_eq!(summary.completed, 2);

    let plc = read_references(&paths.plc).unwrap();
    let plc_names: Vec<&str> = plc.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(plc_names, vec!["Acme AB", "Gamma AB"]);

    let details = read_records(&paths.details).unwrap();
    let names: Vec<&str> = details.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Beta AB", "Acme AB", "Gamma AB"]);
    assert_eq!(details[1].org_number.as_deref(), Some("5561234567"));
    assert_eq!(details[2].org_number.as_deref(), Some("5560000001"));

    let rerun = run_details(&ctx).await.unwrap();
    assert_eq!(rerun.pending, 0);
    assert_eq!(rerun.completed, 0);
}

#[tokio::test]
async fn unreachable_profiles_are_still_checkpointed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/foretag/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), dir.path());
    let paths = StagePaths::new(dir.path(), &config.harvest.filename_tag());
    write_references(
        &paths.companies,
        &profile_refs(&server.uri(), &[("Acme AB", "5561234567")]),
    )
    .unwrap();

    let ctx = StageContext::new(&config, &paths, CancellationToken::new()).unwrap();
    let summary = run_details(&ctx).await.unwrap();

    assert_eq!(summary.completed, 1);
    let details = read_records(&paths.details).unwrap();
    assert_eq!(details[0].name, "Acme AB");
    assert_eq!(details[0].org_number, None);

    let rerun = run_details(&ctx).await.unwrap();
    assert_eq!(rerun.pending, 0);
}

#[tokio::test]
async fn cancelled_details_stage_leaves_a_valid_empty_dataset() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), dir.path());
    let paths = StagePaths::new(dir.path(), &config.harvest.filename_tag());
    write_references(
        &paths.companies,
        &profile_refs(&server.uri(), &[("Acme AB", "5561234567"), ("Beta AB", "5569876543")]),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let ctx = StageContext::new(&config, &paths, cancel).unwrap();
    let summary = run_details(&ctx).await.unwrap();

    assert_eq!(summary.pending, 2);
    assert_eq!(summary.completed, 0);
    assert!(summary.cancelled);
    assert!(read_records(&paths.details).unwrap().is_empty());
}

#[tokio::test]
async fn details_without_companies_file_points_at_enumerate() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config("http://127.0.0.1:9", dir.path());
    let paths = StagePaths::new(dir.path(), &config.harvest.filename_tag());
    let ctx = StageContext::new(&config, &paths, CancellationToken::new()).unwrap();

    let err = run_details(&ctx).await.unwrap_err();
    assert!(format!("{err:#}").contains("abdb enumerate"));
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

#[test]
fn google_backend_needs_key_and_engine_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config("http://127.0.0.1:9", dir.path());
    config.search_provider = SearchProvider::Google;
    let fetcher = Fetcher::from_config(&config).unwrap();

    let err = search_backend(&config, &fetcher).err().unwrap();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref var) if var == "ABDB_SEARCH_CX"));

    config.search_cx = Some("engine".to_owned());
    let err = search_backend(&config, &fetcher).err().unwrap();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref var) if var == "ABDB_SEARCH_API_KEY"));

    config.search_api_key = Some("key".to_owned());
    assert_eq!(search_backend(&config, &fetcher).unwrap().name(), "google");
}

#[test]
fn brave_needs_key_and_duckduckgo_needs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config("http://127.0.0.1:9", dir.path());
    let fetcher = Fetcher::from_config(&config).unwrap();
    assert_eq!(search_backend(&config, &fetcher).unwrap().name(), "duckduckgo");

    config.search_provider = SearchProvider::Brave;
    assert!(search_backend(&config, &fetcher).is_err());
    config.search_api_key = Some("key".to_owned());
    assert_eq!(search_backend(&config, &fetcher).unwrap().name(), "brave");
}

#[tokio::test]
async fn contacts_stage_keeps_known_websites_and_checkpoints() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>Skriv till INFO@acme.se</p>"))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config("http://127.0.0.1:9", dir.path());
    let paths = StagePaths::new(dir.path(), &config.harvest.filename_tag());

    let mut record = EntityRecord::from_reference(&EntityReference::new(
        "Acme AB",
        "https://www.allabolag.se/foretag/acme/-/5561234567",
    ));
    record.website = Some(site.uri());
    let mut appender = DatasetAppender::open(&paths.details).unwrap();
    appender.append(&record).unwrap();
    drop(appender);

    let ctx = StageContext::new(&config, &paths, CancellationToken::new()).unwrap();
    let summary = run_contacts(&ctx).await.unwrap();

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.websites_found, 0);
    assert_eq!(summary.emails_added, 1);

    let web = read_records(&paths.web).unwrap();
    assert_eq!(web[0].website.as_deref(), Some(site.uri().as_str()));
    assert_eq!(web[0].emails, vec!["info@acme.se"]);

    let rerun = run_contacts(&ctx).await.unwrap();
    assert_eq!(rerun.pending, 0);
}
