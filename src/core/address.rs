//! Best-effort address heuristics for the shipment provider payload
//!
//! The provider wants structured city/district/ward fields but the system
//! only stores a free-text address. This parser lower-cases the input,
//! matches a fixed set of Vietnamese city name variants (diacritic and
//! abbreviated forms included) and falls back to a default city when nothing
//! matches. District extraction is a simple "district N" / "quận N" pattern;
//! ward extraction is not attempted. Production-quality geocoding is
//! deliberately out of scope.

use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_CITY: &str = "Ho Chi Minh City";

/// Known city variants, checked in order. First match wins.
const CITIES: &[(&[&str], &str)] = &[
    (&["ho chi minh", "hồ chí minh", "hcm"], "Ho Chi Minh City"),
    (&["hanoi", "hà nội"], "Hanoi"),
    (&["da nang", "đà nẵng"], "Da Nang"),
    (&["can tho", "cần thơ"], "Can Tho"),
    (&["hai phong", "hải phòng"], "Hai Phong"),
];

static DISTRICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:district|quận)\s*(\d+)").expect("valid district regex"));

/// Structured fields extracted from a free-text address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub city: String,
    /// `"District N"` when found, otherwise empty.
    pub district: String,
    /// Always empty; kept for wire-format parity with the provider.
    pub ward: String,
}

/// Parse a free-text address into (city, district, ward).
///
/// Never fails: empty, whitespace-only, or symbol-only input yields the
/// default city with empty district and ward.
pub fn parse(address: &str) -> ParsedAddress {
    let lower = address.to_lowercase();

    let city = CITIES
        .iter()
        .find(|(variants, _)| variants.iter().any(|v| lower.contains(v)))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(DEFAULT_CITY);

    let district = DISTRICT_RE
        .captures(&lower)
        .map(|caps| format!("District {}", &caps[1]))
        .unwrap_or_default();

    ParsedAddress {
        city: city.to_string(),
        district,
        ward: String::new(),
    }
}
