//! End-to-end analysis: debris page → map crawl → correlation → report.

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use url::Url;

use debrisscan_crawler::{CrawlObserver, Crawler, FetchOptions, Fetcher};
use debrisscan_extract::{map_url, read_debris_page};
use debrisscan_shared::{
    Coords, CrawlConfig, DebrisError, FleetId, FleetRecord, Result, validate_tolerance,
};

use crate::correlate::{self, Resolution};

/// Where the debris overview page comes from.
#[derive(Debug, Clone)]
pub enum PageSource {
    /// Fetch the page over HTTP.
    Url(Url),
    /// Read a saved copy from disk; `base_url` anchors the map and fleet
    /// URLs that would otherwise be relative to the live page.
    File { path: PathBuf, base_url: Url },
}

/// Configuration for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// The debris page to analyze.
    pub source: PageSource,
    /// Crawl pacing and retry configuration.
    pub crawl: CrawlConfig,
    /// Correlation tolerance; 0 requires exact value equality.
    pub tolerance: f64,
}

/// One crawled candidate as shown in the terminal report.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub fleet_id: FleetId,
    pub owner: String,
    pub recyclers: u64,
    pub credits: u64,
}

impl From<&FleetRecord> for CandidateSummary {
    fn from(record: &FleetRecord) -> Self {
        Self {
            fleet_id: record.fleet_id.clone(),
            owner: record.owner.clone(),
            recyclers: record.recyclers,
            credits: record.credits(),
        }
    }
}

/// Final report handed to the sink.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    /// Coordinates the map crawl was anchored at.
    pub coords: Coords,
    /// Number of fleet references discovered on the map.
    pub fleets_total: usize,
    /// Crawled candidates, in discovery order.
    pub candidates: Vec<CandidateSummary>,
    /// Number of Unknown rows on the debris page.
    pub unknown_count: usize,
    /// Number of rows that resolved to an owner.
    pub resolved: usize,
    /// Per-entry outcome, in page order.
    pub resolutions: Vec<Resolution>,
    /// Diagnostic log accumulated across the crawl.
    pub diagnostics: Vec<String>,
    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status to the sink.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each fleet reference is processed during the crawl.
    fn fleet_processed(&self, processed: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &AnalysisReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn fleet_processed(&self, _processed: usize, _total: usize) {}
    fn done(&self, _report: &AnalysisReport) {}
}

/// Adapts a `ProgressReporter` to the crawl engine's observer interface.
struct PipelineCrawlObserver<'a> {
    inner: &'a dyn ProgressReporter,
}

impl CrawlObserver for PipelineCrawlObserver<'_> {
    fn fleet_processed(&self, processed: usize, total: usize) {
        self.inner.fleet_processed(processed, total);
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full analysis.
///
/// 1. Load the debris page and read its facts (fixtures, coordinates,
///    Unknown rows)
/// 2. Crawl every fleet linked from the map page at those coordinates
/// 3. Correlate published values against candidate values
///
/// Partial crawl results are never surfaced: a map-level failure or
/// cancellation aborts the run with no report.
#[instrument(skip_all, fields(tolerance = config.tolerance))]
pub async fn analyze(
    config: &AnalyzeConfig,
    progress: &dyn ProgressReporter,
    cancel: &CancellationToken,
) -> Result<AnalysisReport> {
    let start = Instant::now();
    validate_tolerance(config.tolerance)?;

    progress.phase("Reading debris page");
    let (html, base_url) = load_page(&config.source, &config.crawl).await?;
    let facts = read_debris_page(&html)?;
    info!(coords = %facts.coords, unknowns = facts.unknowns.len(), "debris page read");

    let map = map_url(&base_url, &facts.coords)?;

    progress.phase("Crawling fleets");
    let crawler = Crawler::new(&config.crawl)?;
    let observer = PipelineCrawlObserver { inner: progress };
    let outcome = crawler.crawl(&map, &observer, cancel).await?;

    progress.phase("Correlating debris values");
    let assignment = correlate::correlate(&facts.unknowns, &outcome.records, config.tolerance);

    let report = AnalysisReport {
        coords: facts.coords,
        fleets_total: outcome.total,
        candidates: outcome.records.iter().map(CandidateSummary::from).collect(),
        unknown_count: facts.unknowns.len(),
        resolved: assignment.resolved,
        resolutions: assignment.resolutions,
        diagnostics: outcome.log,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };

    progress.done(&report);

    info!(
        resolved = report.resolved,
        unknowns = report.unknown_count,
        candidates = report.candidates.len(),
        elapsed_ms = report.elapsed_ms,
        "analysis complete"
    );

    Ok(report)
}

/// Load the debris page text and the base URL crawl targets resolve against.
async fn load_page(source: &PageSource, crawl: &CrawlConfig) -> Result<(String, Url)> {
    match source {
        PageSource::Url(url) => {
            let fetcher = Fetcher::new(FetchOptions::from(crawl))?;
            let html = fetcher.fetch(url).await?;
            Ok((html, url.clone()))
        }
        PageSource::File { path, base_url } => {
            let html =
                std::fs::read_to_string(path).map_err(|e| DebrisError::io(path, e))?;
            Ok((html, base_url.clone()))
        }
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
        fleet_events: Mutex<Vec<(usize, usize)>>,
    }

    impl RecordingProgress {
        fn new() -> Self {
            Self {
                phases: Mutex::new(Vec::new()),
                fleet_events: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn fleet_processed(&self, processed: usize, total: usize) {
            self.fleet_events.lock().unwrap().push((processed, total));
        }
        fn done(&self, _report: &AnalysisReport) {}
    }

    fn test_config(source: PageSource, tolerance: f64) -> AnalyzeConfig {
        AnalyzeConfig {
            source,
            crawl: CrawlConfig {
                request_delay_ms: 1,
                max_attempts: 2,
                timeout_secs: 5,
                backoff_ms: 10,
            },
            tolerance,
        }
    }

    const DEBRIS: &str = r#"<html><body>
        <div class="box-title-center">Debris Field B1:01:10:10</div>
        <table id="credits_debris-info">
            <tr><td>Unknown</td><td>100</td></tr>
        </table>
    </body></html>"#;

    const MAP: &str = r#"<html><body>
        <a href="fleet.aspx?fleet=1">one</a>
        <a href="fleet.aspx?fleet=2">two</a>
        <a href="fleet.aspx?fleet=3">three</a>
    </body></html>"#;

    fn fleet_page(owner: &str, recyclers: &str) -> String {
        format!(
            r#"<html><body>
                <p><a href="profile.aspx?player=1">{owner}</a></p>
                <table><tr><td>Recycler</td><td>{recyclers}</td></tr></table>
            </body></html>"#
        )
    }

    async fn mount_scenario(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/credits.aspx"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DEBRIS))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/map.aspx"))
            .and(query_param("loc", "B1:01:10:10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MAP))
            .mount(server)
            .await;

        // Fleet 1: 10 recyclers → 100 credits, matches the Unknown row.
        Mock::given(method("GET"))
            .and(path("/fleet.aspx"))
            .and(query_param("fleet", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fleet_page("Ann", "10")))
            .mount(server)
            .await;

        // Fleet 2: zero recyclers, silently dropped.
        Mock::given(method("GET"))
            .and(path("/fleet.aspx"))
            .and(query_param("fleet", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fleet_page("Bob", "0")))
            .mount(server)
            .await;

        // Fleet 3: fails on every attempt.
        Mock::given(method("GET"))
            .and(path("/fleet.aspx"))
            .and(query_param("fleet", "3"))
            .respond_with(ResponseTemplate::new(500))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn resolves_unknown_entry_end_to_end() {
        let server = MockServer::start().await;
        mount_scenario(&server).await;

        let source = PageSource::Url(
            Url::parse(&format!("{}/credits.aspx?view=debris_info", server.uri())).unwrap(),
        );
        let progress = RecordingProgress::new();

        let report = analyze(
            &test_config(source, 0.05),
            &progress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.coords.as_str(), "B1:01:10:10");
        assert_eq!(report.fleets_total, 3);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].credits, 100);
        assert_eq!(report.unknown_count, 1);
        assert_eq!(report.resolved, 1);
        assert_eq!(report.resolutions[0].owner.as_deref(), Some("Ann"));
        assert_eq!(report.diagnostics.len(), 1);

        assert_eq!(
            progress.fleet_events.lock().unwrap().clone(),
            vec![(1, 3), (2, 3), (3, 3)]
        );
        let phases = progress.phases.lock().unwrap().clone();
        assert_eq!(phases.first().map(String::as_str), Some("Reading debris page"));
    }

    #[tokio::test]
    async fn file_source_crawls_against_base_url() {
        let server = MockServer::start().await;
        mount_scenario(&server).await;

        let dir = std::env::temp_dir().join("debrisscan-pipeline-test");
        std::fs::create_dir_all(&dir).unwrap();
        let page = dir.join("debris.html");
        std::fs::write(&page, DEBRIS).unwrap();

        let source = PageSource::File {
            path: page,
            base_url: Url::parse(&format!("{}/credits.aspx", server.uri())).unwrap(),
        };

        let report = analyze(
            &test_config(source, 0.05),
            &SilentProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.resolved, 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn invalid_tolerance_is_rejected_before_any_fetch() {
        let source = PageSource::Url(Url::parse("http://127.0.0.1:9/credits.aspx").unwrap());
        let err = analyze(
            &test_config(source, -1.0),
            &SilentProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DebrisError::Config { .. }));
    }

    #[tokio::test]
    async fn report_serializes_to_json() {
        let server = MockServer::start().await;
        mount_scenario(&server).await;

        let source = PageSource::Url(
            Url::parse(&format!("{}/credits.aspx?view=debris_info", server.uri())).unwrap(),
        );
        let report = analyze(
            &test_config(source, 0.05),
            &SilentProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["coords"], "B1:01:10:10");
        assert_eq!(json["resolved"], 1);
        assert_eq!(json["resolutions"][0]["owner"], "Ann");
    }
}
