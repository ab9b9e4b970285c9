//! Core domain types for debris analysis.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::value;

/// Pattern for map coordinates as they appear in page titles, e.g. `B3:12:40:10`.
static COORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^B\d+:\d+:\d+:\d+$").expect("coords regex"));

// ---------------------------------------------------------------------------
// FleetId
// ---------------------------------------------------------------------------

/// Opaque identifier of one fleet as linked from a map listing.
///
/// Unique within a map page and stable across repeated visits within a
/// session. The host assigns these; we never synthesize them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FleetId(pub String);

impl FleetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FleetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Coords
// ---------------------------------------------------------------------------

/// Map coordinates of a debris field (`B<server>:<galaxy>:<region>:<system>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coords(String);

impl Coords {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Coords {
    type Err = crate::DebrisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if COORDS_RE.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(crate::DebrisError::parse(format!(
                "invalid coordinates '{s}': expected B<n>:<n>:<n>:<n>"
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// FleetRecord
// ---------------------------------------------------------------------------

/// One successfully parsed fleet detail page.
///
/// Immutable after creation; a record with no owner name is never built,
/// and records with zero recyclers are dropped by the crawl engine before
/// they reach the correlator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetRecord {
    /// The map link this record was fetched from.
    pub fleet_id: FleetId,
    /// Display name of the controlling player.
    pub owner: String,
    /// Count of recyclers aboard.
    pub recyclers: u64,
}

impl FleetRecord {
    /// Debris value this fleet can account for, derived from the recycler
    /// count so the conversion rate stays a single source of truth.
    pub fn credits(&self) -> u64 {
        value::credits_for(self.recyclers)
    }
}

// ---------------------------------------------------------------------------
// UnknownEntry
// ---------------------------------------------------------------------------

/// One row on the debris page whose owner is hidden as "Unknown".
///
/// Read once per run; the core never mutates the page, it only reports a
/// mapping keyed by `row` back to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownEntry {
    /// Index of the row within the debris table, for the sink to address.
    pub row: usize,
    /// Credits value the host published for the row.
    pub credits: u64,
}
