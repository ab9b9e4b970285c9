//! Shared types, error model, and configuration for debrisscan.
//!
//! This crate is the foundation depended on by all other debrisscan crates.
//! It provides:
//! - [`DebrisError`] — the unified error type, plus the per-attempt [`FetchError`]
//! - Domain types ([`FleetId`], [`FleetRecord`], [`UnknownEntry`], [`Coords`])
//! - The value model ([`value::credits_for`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;
pub mod value;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CorrelationConfig, CrawlConfig, DefaultsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_tolerance,
};
pub use error::{DebrisError, FetchError, Result};
pub use types::{Coords, FleetId, FleetRecord, UnknownEntry};
pub use value::{CREDITS_PER_RECYCLER, credits_for};
