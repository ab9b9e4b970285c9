//! Structured extraction of facts from the game's HTML pages.
//!
//! Three page families are understood:
//! - [`debris`] — the debris overview page (coordinates, "Unknown" rows)
//! - [`map`] — a map listing page (fleet references)
//! - [`fleet`] — a fleet detail page (owner name, recycler count)
//!
//! HTML is parsed internally with `scraper`; callers hand in page text and
//! get structured facts back, so no parse tree ever crosses an await point.

pub mod debris;
pub mod fleet;
pub mod map;

pub use debris::{DebrisPageFacts, read_debris_page};
pub use fleet::{fleet_record, fleet_url};
pub use map::{fleet_references, map_url};

/// Parse a displayed number, ignoring thousands separators and any other
/// non-digit decoration. `None` when no digits are present.
pub(crate) fn parse_number(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_strips_separators() {
        assert_eq!(parse_number("1,250"), Some(1250));
        assert_eq!(parse_number(" 5.000 "), Some(5000));
        assert_eq!(parse_number("42"), Some(42));
    }

    #[test]
    fn parse_number_rejects_non_numeric() {
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number(""), None);
    }
}
