//! Fleet discovery from a map listing page.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use debrisscan_shared::{Coords, DebrisError, FleetId, Result};

/// Links whose target encodes a fleet detail page.
const FLEET_LINK_SELECTOR: &str = r#"a[href^="fleet.aspx?fleet="]"#;

/// Build the map listing URL for a coordinate set, relative to the page the
/// coordinates were read from.
pub fn map_url(base: &Url, coords: &Coords) -> Result<Url> {
    base.join(&format!("map.aspx?loc={coords}"))
        .map_err(|e| DebrisError::parse(format!("cannot build map URL for {coords}: {e}")))
}

/// Collect the distinct fleet ids linked from a map page.
///
/// Deduplicated by id, not by link instance — a fleet can be linked several
/// times from one page — preserving first-seen order.
pub fn fleet_references(html: &str, base_url: &Url) -> Vec<FleetId> {
    let doc = Html::parse_document(html);
    let link_sel = Selector::parse(FLEET_LINK_SELECTOR).unwrap();

    let mut seen = HashSet::new();
    let mut references = Vec::new();

    for el in doc.select(&link_sel) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base_url.join(href) else {
            continue;
        };
        let Some(id) = resolved
            .query_pairs()
            .find(|(key, _)| key == "fleet")
            .map(|(_, value)| value.into_owned())
        else {
            continue;
        };
        if id.is_empty() {
            continue;
        }
        if seen.insert(id.clone()) {
            references.push(FleetId::new(id));
        }
    }

    debug!(fleets = references.len(), "fleet references extracted");
    references
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/map.aspx?loc=B1:01:10:10").unwrap()
    }

    #[test]
    fn map_url_is_relative_to_page() {
        let coords: Coords = "B3:12:40:10".parse().unwrap();
        let page = Url::parse("https://example.com/credits.aspx?view=debris_info").unwrap();
        let url = map_url(&page, &coords).expect("build map url");
        assert_eq!(url.as_str(), "https://example.com/map.aspx?loc=B3:12:40:10");
    }

    #[test]
    fn extracts_fleet_ids_in_first_seen_order() {
        let html = r#"
            <a href="fleet.aspx?fleet=7">Fleet</a>
            <a href="fleet.aspx?fleet=3">Fleet</a>
            <a href="fleet.aspx?fleet=11">Fleet</a>
        "#;
        let ids = fleet_references(html, &base());
        assert_eq!(ids, vec![FleetId::new("7"), FleetId::new("3"), FleetId::new("11")]);
    }

    #[test]
    fn duplicate_links_yield_one_reference() {
        let html = r#"
            <a href="fleet.aspx?fleet=42">icon</a>
            <a href="fleet.aspx?fleet=42">name</a>
        "#;
        let ids = fleet_references(html, &base());
        assert_eq!(ids, vec![FleetId::new("42")]);
    }

    #[test]
    fn ignores_unrelated_links() {
        let html = r#"
            <a href="profile.aspx?player=9">player</a>
            <a href="map.aspx?loc=B1:01:10:11">next system</a>
        "#;
        assert!(fleet_references(html, &base()).is_empty());
    }

    #[test]
    fn map_fixture_yields_deduped_set() {
        let path = "../../../fixtures/html/map.html";
        let html = std::fs::read_to_string(path).expect("missing map fixture");
        let ids = fleet_references(&html, &base());
        assert_eq!(ids, vec![FleetId::new("1"), FleetId::new("2"), FleetId::new("3")]);
    }
}
