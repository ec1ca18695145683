//! Published column names of the derived tables.

pub const STATE_FIPS: &str = "State FIPS";
pub const FIPS: &str = "FIPS";
pub const COUNTY: &str = "County";
pub const STATE: &str = "State/Territory";
pub const COUNTY_STATE: &str = "County-State";
pub const CODE: &str = "Code";
pub const UNION_STATUS: &str = "Union Status";
pub const DATE: &str = "Date";

pub const COUNTY_LAT: &str = "Lat";
pub const COUNTY_LON: &str = "Long_";
pub const STATE_LAT: &str = "lat";
pub const STATE_LON: &str = "lon";

pub const POPULATION: &str = "Population";
pub const POP_FACTOR: &str = "pop_factor";

// raw totals in the aggregate tables
pub const CONFIRMED_RAW: &str = "confirmed";
pub const DEATHS_RAW: &str = "deaths";

pub const CONFIRMED_CASES: &str = "Confirmed Cases";
pub const DEATHS: &str = "Deaths";

pub const DEATH_RATE: &str = "Death Rate (%)";
pub const INFECTION_RATE: &str = "Confirmed Infection Rate (%)";
pub const CASES_PER_1000: &str = "Cases per 1000";
pub const CASES_PER_100K: &str = "Cases per 100k";
pub const DEATHS_PER_100K: &str = "Deaths per 100k";
pub const CC_PER_100K: &str = "cc_per_100k";
pub const D_PER_100K: &str = "d_per_100k";
pub const CONFIRMED_PER_100K: &str = "Confirmed Cases per 100k";

pub const EST_POP: &str = "Est Pop";
pub const STATE_EST_POP: &str = "2019 Est Pop";
pub const US_POPULATION: &str = "U.S. Population";
pub const DEATH_RATE_DISPLAY: &str = "Death Rate";
