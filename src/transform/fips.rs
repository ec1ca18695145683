use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::source::utils::parse_count;

/// State-code prefixes that are not counties: `00` regions/cities that are
/// not counties, `80` out-of-state, `88` and `99` cruise ships.
pub const EXCLUDED_STATE_FIPS: [&str; 4] = ["00", "80", "88", "99"];

/// Territories dropped from every state-level table.
pub const EXCLUDED_TERRITORIES: [&str; 7] = [
    "American Samoa",
    "Federated States of Micronesia",
    "Palau",
    "Guam",
    "Virgin Islands",
    "Marshall Islands",
    "Northern Mariana Islands",
];

static EXCLUDED_TERRITORY_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| EXCLUDED_TERRITORIES.iter().copied().collect());

pub const COUNTY_FIPS_WIDTH: usize = 5;
pub const STATE_FIPS_WIDTH: usize = 2;

/// Zero-pad a FIPS cell to `width`. Blank or unparseable cells count as 0;
/// `"1001.0"` becomes `"01001"`.
pub fn normalize_fips(raw: &str, width: usize) -> String {
    let code = parse_count(raw).unwrap_or(0);
    format!("{:0width$}", code, width = width)
}

/// First two characters of a normalized county FIPS.
pub fn state_prefix(county_fips: &str) -> &str {
    county_fips.get(..STATE_FIPS_WIDTH).unwrap_or(county_fips)
}

pub fn is_excluded_state_fips(state_fips: &str) -> bool {
    EXCLUDED_STATE_FIPS.contains(&state_fips)
}

pub fn is_excluded_territory(name: &str) -> bool {
    EXCLUDED_TERRITORY_SET.contains(name)
}
