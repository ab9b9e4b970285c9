//! Fleet detail page extraction: owner lookup strategies and recycler count.

use scraper::{Html, Selector};
use tracing::{debug, trace};
use url::Url;

use debrisscan_shared::{DebrisError, FleetId, FleetRecord, Result};

use crate::parse_number;

/// One owner lookup heuristic over a parsed fleet page.
type OwnerStrategy = fn(&Html) -> Option<String>;

/// Lookup strategies in priority order; the first non-empty name wins.
/// Each is pure and independently fallible — a strategy that matches
/// nothing simply yields `None` and the next one is tried.
const OWNER_STRATEGIES: &[(&str, OwnerStrategy)] = &[
    ("layout-table", owner_from_layout_table),
    ("profile-link", owner_from_profile_link),
    ("player-label", owner_from_player_label),
];

/// Build the fleet detail URL for one fleet id, relative to the map page.
pub fn fleet_url(base: &Url, id: &FleetId) -> Result<Url> {
    base.join(&format!("fleet.aspx?fleet={id}"))
        .map_err(|e| DebrisError::parse(format!("cannot build fleet URL for {id}: {e}")))
}

/// Extract a candidate record from a fleet detail page.
///
/// `None` when no strategy can find an owner name; the crawl engine logs
/// and skips such fleets. A missing or unparseable recycler row reads as
/// zero, which the engine drops silently.
pub fn fleet_record(html: &str, fleet_id: &FleetId) -> Option<FleetRecord> {
    let doc = Html::parse_document(html);

    let owner = extract_owner(&doc)?;
    let recyclers = extract_recyclers(&doc);

    Some(FleetRecord {
        fleet_id: fleet_id.clone(),
        owner,
        recyclers,
    })
}

fn extract_owner(doc: &Html) -> Option<String> {
    for (name, strategy) in OWNER_STRATEGIES {
        if let Some(owner) = strategy(doc) {
            debug!(strategy = name, %owner, "owner resolved");
            return Some(owner);
        }
        trace!(strategy = name, "no owner from strategy");
    }
    None
}

/// Structural lookup anchored at the known fleet-page layout: the profile
/// link in the first cell of the second layout-table row.
fn owner_from_layout_table(doc: &Html) -> Option<String> {
    let sel = Selector::parse(
        r#"table.layout tr:nth-of-type(2) td:first-child a[href*="profile.aspx"]"#,
    )
    .unwrap();
    doc.select(&sel).next().and_then(|el| non_empty_text(el))
}

/// Relaxed lookup: any direct profile link on the page.
fn owner_from_profile_link(doc: &Html) -> Option<String> {
    let sel = Selector::parse(r#"a[href^="profile.aspx?player="]"#).unwrap();
    doc.select(&sel).next().and_then(|el| non_empty_text(el))
}

/// Fallback lookup: a "Player" label cell followed by a profile link in a
/// later cell of the same row.
fn owner_from_player_label(doc: &Html) -> Option<String> {
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();
    let link_sel = Selector::parse(r#"a[href*="profile"]"#).unwrap();

    for tr in doc.select(&row_sel) {
        let cells: Vec<_> = tr.select(&cell_sel).collect();
        let Some(label_idx) = cells
            .iter()
            .position(|td| td.text().collect::<String>().contains("Player"))
        else {
            continue;
        };

        for td in &cells[label_idx + 1..] {
            if let Some(owner) = td.select(&link_sel).next().and_then(|el| non_empty_text(el)) {
                return Some(owner);
            }
        }
    }
    None
}

/// Count recyclers from the unit table: the first row whose label cell
/// mentions "Recycler" (case-insensitive, bolded labels included since the
/// text of descendants is flattened), reading the adjacent numeric cell.
fn extract_recyclers(doc: &Html) -> u64 {
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();

    for tr in doc.select(&row_sel) {
        let cells: Vec<_> = tr.select(&cell_sel).collect();
        if cells.len() < 2 {
            continue;
        }

        let label = cells[0].text().collect::<String>();
        if !label.to_ascii_lowercase().contains("recycler") {
            continue;
        }

        return parse_number(&cells[1].text().collect::<String>()).unwrap_or(0);
    }
    0
}

fn non_empty_text(el: scraper::ElementRef<'_>) -> Option<String> {
    let text = el.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}
