//! Best-effort price and surface extraction from listing text.

use std::sync::LazyLock;

use regex::Regex;

use super::types::ListingExtract;

/// Integer followed by a euro sign.
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*€").expect("valid price regex"));

/// Integer followed by square metres.
static SURFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*m²").expect("valid surface regex"));

/// Scans `text` for the first price mention and the first surface mention.
///
/// Both lookups are independent and only the first occurrence of each is
/// used. Digit groups separated by spaces are not joined, so "250 000 €"
/// reads as 0.
pub fn extract(text: &str) -> ListingExtract {
    ListingExtract {
        list_price: first_integer(&PRICE_RE, text),
        surface: first_integer(&SURFACE_RE, text),
    }
}

fn first_integer(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<f64>().ok())
}
