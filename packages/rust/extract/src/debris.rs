//! Reading the debris overview page: fixture checks, map coordinates, and
//! the anonymized "Unknown" rows.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use debrisscan_shared::{Coords, DebrisError, Result, UnknownEntry};

use crate::parse_number;

/// Selectors that must be present for analysis to be possible at all.
/// Checked once, before any network activity.
const REQUIRED_SELECTORS: &[&str] = &["#credits_debris-info", ".box-title-center"];

/// Coordinates as embedded in the page title, e.g. "Debris Field B3:12:40:10".
static COORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"B\d+:\d+:\d+:\d+").expect("coords regex"));

/// Facts read once from the debris page before any crawling starts.
#[derive(Debug, Clone)]
pub struct DebrisPageFacts {
    /// Coordinates of the system the debris sits in, from the page title.
    pub coords: Coords,
    /// Unknown-owner rows, in display order.
    pub unknowns: Vec<UnknownEntry>,
}

/// Extract coordinates and Unknown rows from the debris overview page.
///
/// Fails with [`DebrisError::Environment`] when required fixtures are
/// absent, and with [`DebrisError::Structure`] when the title carries no
/// coordinates. Zero Unknown rows is not an error.
pub fn read_debris_page(html: &str) -> Result<DebrisPageFacts> {
    let doc = Html::parse_document(html);

    verify_fixtures(&doc)?;
    let coords = extract_coords(&doc)?;
    let unknowns = collect_unknowns(&doc);

    debug!(%coords, unknowns = unknowns.len(), "debris page parsed");
    Ok(DebrisPageFacts { coords, unknowns })
}

/// Check that the page actually is a debris overview page.
fn verify_fixtures(doc: &Html) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_SELECTORS
        .iter()
        .copied()
        .filter(|s| {
            let sel = Selector::parse(s).unwrap();
            doc.select(&sel).next().is_none()
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DebrisError::environment(missing.join(", ")))
    }
}

/// Pull the map coordinates out of the title element.
fn extract_coords(doc: &Html) -> Result<Coords> {
    let title_sel = Selector::parse(".box-title-center").unwrap();
    let title = doc
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    COORDS_RE
        .find(&title)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| DebrisError::structure("no coordinates found in the page title"))
}

/// Collect the Unknown-owner rows from the debris table.
///
/// A qualifying row has exactly two cells, an owner cell reading "Unknown"
/// (case-insensitive) and a numeric credits cell. Rows whose credits cell
/// does not parse are ignored rather than reported.
fn collect_unknowns(doc: &Html) -> Vec<UnknownEntry> {
    let row_sel = Selector::parse("#credits_debris-info tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();

    let mut unknowns = Vec::new();
    for (row, tr) in doc.select(&row_sel).enumerate() {
        let cells: Vec<_> = tr.select(&cell_sel).collect();
        if cells.len() != 2 {
            continue;
        }

        let owner = cells[0].text().collect::<String>();
        if !owner.trim().eq_ignore_ascii_case("unknown") {
            continue;
        }

        if let Some(credits) = parse_number(&cells[1].text().collect::<String>()) {
            unknowns.push(UnknownEntry { row, credits });
        }
    }
    unknowns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    #[test]
    fn reads_coords_and_unknowns() {
        let facts = read_debris_page(&load_fixture("debris.html")).expect("parse debris page");
        assert_eq!(facts.coords.as_str(), "B3:12:40:10");
        // Two Unknown rows; the named player and header rows are skipped.
        assert_eq!(facts.unknowns.len(), 2);
        assert_eq!(facts.unknowns[0].credits, 100);
        assert_eq!(facts.unknowns[1].credits, 12_500);
        // Row handles point at distinct rows in display order.
        assert!(facts.unknowns[0].row < facts.unknowns[1].row);
    }

    #[test]
    fn unknown_match_is_case_insensitive() {
        let html = r#"
            <div class="box-title-center">Debris Field B1:01:10:10</div>
            <table id="credits_debris-info">
                <tr><td>UNKNOWN</td><td>1,000</td></tr>
            </table>
        "#;
        let facts = read_debris_page(html).expect("parse");
        assert_eq!(facts.unknowns.len(), 1);
        assert_eq!(facts.unknowns[0].credits, 1000);
    }

    #[test]
    fn missing_fixture_is_environment_error() {
        let err = read_debris_page(&load_fixture("debris_missing_table.html")).unwrap_err();
        match err {
            DebrisError::Environment { missing } => {
                assert!(missing.contains("#credits_debris-info"));
            }
            other => panic!("expected environment error, got {other}"),
        }
    }

    #[test]
    fn missing_coords_is_structure_error() {
        let err = read_debris_page(&load_fixture("debris_no_coords.html")).unwrap_err();
        assert!(matches!(err, DebrisError::Structure { .. }));
    }

    #[test]
    fn page_with_no_unknown_rows_is_fine() {
        let html = r#"
            <div class="box-title-center">Debris Field B1:01:10:10</div>
            <table id="credits_debris-info">
                <tr><td>Trogdor</td><td>500</td></tr>
            </table>
        "#;
        let facts = read_debris_page(html).expect("parse");
        assert!(facts.unknowns.is_empty());
    }
}
