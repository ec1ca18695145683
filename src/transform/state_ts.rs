use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use super::{
    county_ts::CountyTimeSeriesRow,
    fips::is_excluded_territory,
    join::left_join,
    metrics::{death_rate, infection_rate, per_capita, pop_factor, PER_100K},
    reference::StateReference,
    rollup::{sum_by, zip_sums},
    StateTimeSeriesTable, Table,
};

const PER_100K_DP: u32 = 0;
const DEATH_RATE_DP: u32 = 6;
const INFECTION_RATE_DP: u32 = 6;

/// One state or territory on one report date.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTimeSeriesRow {
    pub state: String,
    pub date: NaiveDate,
    pub state_fips: Option<String>,
    pub code: Option<String>,
    pub union_status: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub population: Option<u64>,
    pub confirmed: i64,
    pub deaths: i64,
    pub pop_factor: f64,
    pub cases_per_100k: f64,
    pub deaths_per_100k: f64,
    pub death_rate: f64,
    pub infection_rate: f64,
}

/// Roll the county time series up to (state, date), ordered by state then
/// date.
#[instrument(level = "info", skip_all, fields(county_rows = county_time_series.len()))]
pub fn state_time_series(
    county_time_series: &[CountyTimeSeriesRow],
    state_reference: &StateReference,
) -> Result<StateTimeSeriesTable> {
    let confirmed = sum_by(
        county_time_series,
        |r| (&*r.state, r.date),
        |r| Some(r.confirmed),
    );
    let deaths = sum_by(county_time_series, |r| (&*r.state, r.date), |r| r.deaths);
    let totals = zip_sums(confirmed, &deaths);

    let joined = left_join(
        "state_time_series.reference",
        &totals,
        &state_reference.rows,
        |t| t.0 .0,
        |r| r.state.as_str(),
    );

    let mut dropped = 0usize;
    let mut rows = Vec::with_capacity(joined.pairs.len());
    for (&((state, date), confirmed, deaths), reference) in joined.pairs {
        if is_excluded_territory(state) {
            dropped += 1;
            continue;
        }
        let deaths = deaths.unwrap_or(0);
        let population = reference.and_then(|r| r.population);
        rows.push(StateTimeSeriesRow {
            state: state.to_string(),
            date,
            state_fips: reference.map(|r| r.state_fips.clone()),
            code: reference.and_then(|r| r.code.clone()),
            union_status: reference.and_then(|r| r.union_status.clone()),
            lat: reference.and_then(|r| r.lat),
            lon: reference.and_then(|r| r.lon),
            population,
            confirmed,
            deaths,
            pop_factor: pop_factor(population, PER_100K),
            cases_per_100k: per_capita(confirmed, population, PER_100K, PER_100K_DP),
            deaths_per_100k: per_capita(deaths, population, PER_100K, PER_100K_DP),
            death_rate: death_rate(deaths, confirmed, DEATH_RATE_DP),
            infection_rate: infection_rate(confirmed, population, INFECTION_RATE_DP),
        });
    }

    debug!(dropped, "excluded territory rows after roll-up");
    info!(rows = rows.len(), "state time series built");
    Ok(Table::with_warnings(rows, joined.warning.into_iter().collect()))
}
