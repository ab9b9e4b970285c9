//! Value-based one-to-one matching of Unknown rows against crawled fleets.
//!
//! Greedy and order-dependent by design: entries are resolved in page
//! order, each consuming its best available candidate, with no
//! backtracking. At the scale of the problem (tens of rows) this trades a
//! global optimum for predictability.

use serde::Serialize;

use debrisscan_shared::{FleetId, FleetRecord, UnknownEntry};

/// Default relative deviation allowed between an entry's published credits
/// and a candidate's computed credits. 0 requires exact equality.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// One Unknown row's correlation outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Row handle of the Unknown entry on the debris page.
    pub row: usize,
    /// Credits the host published for the row.
    pub credits: u64,
    /// Resolved owner name, if a candidate matched.
    pub owner: Option<String>,
    /// Fleet the owner name came from.
    pub fleet_id: Option<FleetId>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.owner.is_some()
    }
}

/// Output of one correlation run: one resolution per entry, in entry order.
///
/// Injective over candidates — no fleet record is assigned to more than
/// one entry.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub resolutions: Vec<Resolution>,
    /// Number of entries that resolved to an owner.
    pub resolved: usize,
}

/// Match each Unknown entry against the not-yet-consumed candidate whose
/// computed credits deviate least from the published value, within
/// `credits * tolerance`. Ties keep the earlier-discovered candidate;
/// candidates are never re-ordered.
pub fn correlate(
    entries: &[UnknownEntry],
    candidates: &[FleetRecord],
    tolerance: f64,
) -> Assignment {
    let mut consumed = vec![false; candidates.len()];
    let mut resolutions = Vec::with_capacity(entries.len());
    let mut resolved = 0;

    for entry in entries {
        let allowed = entry.credits as f64 * tolerance;

        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            let deviation = (candidate.credits() as f64 - entry.credits as f64).abs();
            if deviation > allowed {
                continue;
            }
            // Strict `<` keeps the earlier-discovered candidate on ties.
            if best.is_none_or(|(_, best_dev)| deviation < best_dev) {
                best = Some((i, deviation));
            }
        }

        match best {
            Some((i, _)) => {
                consumed[i] = true;
                resolved += 1;
                resolutions.push(Resolution {
                    row: entry.row,
                    credits: entry.credits,
                    owner: Some(candidates[i].owner.clone()),
                    fleet_id: Some(candidates[i].fleet_id.clone()),
                });
            }
            None => resolutions.push(Resolution {
                row: entry.row,
                credits: entry.credits,
                owner: None,
                fleet_id: None,
            }),
        }
    }

    Assignment {
        resolutions,
        resolved,
    }
}
