//! Strictly sequential, paced crawl of all fleets on one map page.
//!
//! The host is rate-sensitive; fleet pages are fetched one at a time with a
//! pacing delay between requests, never concurrently. Per-fleet failures
//! are absorbed into a diagnostic log — only map-level failures and
//! cancellation abort a crawl.

use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use debrisscan_extract::{fleet_record, fleet_references, fleet_url};
use debrisscan_shared::{CrawlConfig, DebrisError, FleetId, FleetRecord, Result};

use crate::fetch::{FetchOptions, Fetcher};

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Receives one event per processed fleet reference, in processing order.
pub trait CrawlObserver: Send + Sync {
    /// Called after each reference is handled — recorded, skipped, or failed.
    fn fleet_processed(&self, processed: usize, total: usize);
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl CrawlObserver for SilentObserver {
    fn fleet_processed(&self, _processed: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// CrawlOutcome
// ---------------------------------------------------------------------------

/// Summary of one completed crawl.
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Successfully parsed candidates with at least one recycler, in
    /// discovery order.
    pub records: Vec<FleetRecord>,
    /// Timestamped diagnostics for fleets that were skipped on error.
    pub log: Vec<String>,
    /// Number of fleet references discovered on the map page.
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Drives the fetcher and extractor across all fleets of one map page.
/// One instance per run; owns its own counters and diagnostic log.
pub struct Crawler {
    fetcher: Fetcher,
    request_delay: Duration,
}

impl Crawler {
    /// Create a crawler from the merged runtime configuration.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(FetchOptions::from(config))?,
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Fetch the map page, then every linked fleet page one at a time.
    ///
    /// The map fetch is not optional: a failed fetch or a map with no fleet
    /// links fails the whole crawl. Everything per-fleet is absorbed.
    #[instrument(skip_all, fields(map_url = %map_url))]
    pub async fn crawl(
        &self,
        map_url: &Url,
        observer: &dyn CrawlObserver,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome> {
        let map_html = self.fetcher.fetch(map_url).await?;
        let references = fleet_references(&map_html, map_url);
        if references.is_empty() {
            return Err(DebrisError::structure("no fleets found on the map page"));
        }

        let total = references.len();
        info!(
            total,
            delay_ms = self.request_delay.as_millis() as u64,
            "starting fleet crawl"
        );

        let mut records: Vec<FleetRecord> = Vec::new();
        let mut log: Vec<String> = Vec::new();

        for (index, fleet_id) in references.iter().enumerate() {
            // Pacing delay before every fetch except the first.
            if index > 0 {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(DebrisError::Cancelled),
                    _ = tokio::time::sleep(self.request_delay) => {}
                }
            }
            if cancel.is_cancelled() {
                return Err(DebrisError::Cancelled);
            }

            match self.process_fleet(map_url, fleet_id).await {
                Ok(Some(record)) if record.recyclers > 0 => {
                    debug!(
                        fleet = %fleet_id,
                        owner = %record.owner,
                        recyclers = record.recyclers,
                        "candidate recorded"
                    );
                    records.push(record);
                }
                Ok(Some(_)) => {
                    // Expected, non-exceptional: a fleet without recyclers
                    // cannot explain any debris value.
                    debug!(fleet = %fleet_id, "no recyclers aboard, skipping");
                }
                Ok(None) => {
                    warn!(fleet = %fleet_id, "no owner name found, skipping");
                    log.push(diag(format!("fleet {fleet_id}: no player link found")));
                }
                Err(e) => {
                    warn!(fleet = %fleet_id, error = %e, "fleet skipped");
                    log.push(diag(format!("fleet {fleet_id}: {e}")));
                }
            }

            observer.fleet_processed(index + 1, total);
        }

        info!(
            candidates = records.len(),
            skipped = log.len(),
            "crawl complete"
        );

        Ok(CrawlOutcome {
            records,
            log,
            total,
        })
    }

    /// Fetch and parse one fleet page. `Ok(None)` means the page parsed but
    /// no owner name could be found.
    async fn process_fleet(
        &self,
        map_url: &Url,
        fleet_id: &FleetId,
    ) -> Result<Option<FleetRecord>> {
        let url = fleet_url(map_url, fleet_id)?;
        let html = self.fetcher.fetch(&url).await?;
        Ok(fleet_record(&html, fleet_id))
    }
}

/// Diagnostic log line with a local wall-clock timestamp.
fn diag(message: String) -> String {
    format!("[{}] {message}", Local::now().format("%H:%M:%S"))
}
