use anyhow::Result;
use tracing::{debug, info, instrument};

use super::fips::{
    is_excluded_territory, normalize_fips, COUNTY_FIPS_WIDTH, STATE_FIPS_WIDTH,
};
use crate::source::{
    cell, opt_cell,
    utils::{parse_float, parse_population, parse_text},
    RawTable,
};

/// Static attributes of one state or territory.
#[derive(Debug, Clone, PartialEq)]
pub struct StateReferenceRow {
    pub state: String,
    pub state_fips: String,
    pub code: Option<String>,
    pub union_status: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub population: Option<u64>,
}

/// Static attributes of one county.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyReferenceRow {
    pub fips: String,
    pub county: String,
    pub state: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub population: Option<u64>,
}

/// Cleaned state metadata with the excluded territories removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateReference {
    pub rows: Vec<StateReferenceRow>,
}

/// Cleaned county metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountyReference {
    pub rows: Vec<CountyReferenceRow>,
}

/// Both reference tables of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTables {
    pub states: StateReference,
    pub counties: CountyReference,
}

pub mod columns {
    pub const STATE: &str = "State/Territory";
    pub const STATE_FIPS: &str = "State FIPS";
    pub const CODE: &str = "Code";
    pub const UNION_STATUS: &str = "Union Status";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";
    pub const POPULATION: &str = "Population";

    pub const COUNTY_FIPS: &str = "FIPS";
    pub const COUNTY: &str = "Admin2";
    pub const COUNTY_STATE: &str = "Province_State";
    pub const COUNTY_LAT: &str = "Lat";
    pub const COUNTY_LON: &str = "Long_";
}

/// Parse the state reference table: 2-digit `State FIPS`, territories in
/// the exclusion list dropped.
#[instrument(level = "info", skip(raw), fields(table = %raw.name))]
pub fn load_state_reference(raw: &RawTable) -> Result<StateReference> {
    let state_col = raw.require(columns::STATE)?;
    let fips_col = raw.require(columns::STATE_FIPS)?;
    let pop_col = raw.require(columns::POPULATION)?;
    let code_col = raw.column_index(columns::CODE);
    let union_col = raw.column_index(columns::UNION_STATUS);
    let lat_col = raw.column_index(columns::LAT);
    let lon_col = raw.column_index(columns::LON);

    let mut rows = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;
    for r in &raw.rows {
        let state = cell(r, state_col).trim();
        if is_excluded_territory(state) {
            dropped += 1;
            continue;
        }
        rows.push(StateReferenceRow {
            state: state.to_string(),
            state_fips: normalize_fips(cell(r, fips_col), STATE_FIPS_WIDTH),
            code: parse_text(opt_cell(r, code_col)),
            union_status: parse_text(opt_cell(r, union_col)),
            lat: parse_float(opt_cell(r, lat_col)),
            lon: parse_float(opt_cell(r, lon_col)),
            population: parse_population(cell(r, pop_col)),
        });
    }

    debug!(dropped, "excluded territories from state reference");
    info!(rows = rows.len(), "state reference loaded");
    Ok(StateReference { rows })
}

/// Parse the county reference table: 5-digit `FIPS`.
#[instrument(level = "info", skip(raw), fields(table = %raw.name))]
pub fn load_county_reference(raw: &RawTable) -> Result<CountyReference> {
    let fips_col = raw.require(columns::COUNTY_FIPS)?;
    let county_col = raw.require(columns::COUNTY)?;
    let state_col = raw.require(columns::COUNTY_STATE)?;
    let pop_col = raw.require(columns::POPULATION)?;
    let lat_col = raw.column_index(columns::COUNTY_LAT);
    let lon_col = raw.column_index(columns::COUNTY_LON);

    let rows: Vec<CountyReferenceRow> = raw
        .rows
        .iter()
        .map(|r| CountyReferenceRow {
            fips: normalize_fips(cell(r, fips_col), COUNTY_FIPS_WIDTH),
            county: cell(r, county_col).trim().to_string(),
            state: cell(r, state_col).trim().to_string(),
            lat: parse_float(opt_cell(r, lat_col)),
            lon: parse_float(opt_cell(r, lon_col)),
            population: parse_population(cell(r, pop_col)),
        })
        .collect();

    info!(rows = rows.len(), "county reference loaded");
    Ok(CountyReference { rows })
}

impl ReferenceTables {
    pub fn load(states: &RawTable, counties: &RawTable) -> Result<Self> {
        Ok(Self {
            states: load_state_reference(states)?,
            counties: load_county_reference(counties)?,
        })
    }
}
