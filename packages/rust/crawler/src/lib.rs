//! Network layer for debris analysis.
//!
//! This crate provides:
//! - [`fetch`] — the resilient fetcher (bounded retries, timeout, fixed backoff)
//! - [`engine`] — the strictly sequential, paced crawl over one map's fleets

pub mod engine;
pub mod fetch;

pub use engine::{CrawlObserver, CrawlOutcome, Crawler, SilentObserver};
pub use fetch::{FetchOptions, Fetcher};
