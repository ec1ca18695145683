use anyhow::Result;
use tracing::{debug, info, instrument};

use super::{
    county_agg::CountyAggregateRow,
    fips::is_excluded_territory,
    join::left_join,
    metrics::{death_rate, format_thousands, per_capita, pop_factor, PER_100K},
    reference::{StateReference, StateReferenceRow},
    rollup::{sum_by, zip_sums},
    StateAggregateTable, Table,
};

const PER_100K_DP: u32 = 0;
const DEATH_RATE_DP: u32 = 4;

/// Latest totals of one state or territory.
#[derive(Debug, Clone, PartialEq)]
pub struct StateAggregateRow {
    pub state: String,
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
    pub population_display: String,
    pub confirmed_display: String,
    pub deaths_display: String,
    pub cases_per_100k_display: String,
    pub deaths_per_100k_display: String,
}

impl StateAggregateRow {
    fn new(
        state: &str,
        confirmed: i64,
        deaths: i64,
        reference: Option<&StateReferenceRow>,
    ) -> Self {
        let population = reference.and_then(|r| r.population);
        let cases_per_100k = per_capita(confirmed, population, PER_100K, PER_100K_DP);
        let deaths_per_100k = per_capita(deaths, population, PER_100K, PER_100K_DP);
        Self {
            state: state.to_string(),
            state_fips: reference.map(|r| r.state_fips.clone()),
            code: reference.and_then(|r| r.code.clone()),
            union_status: reference.and_then(|r| r.union_status.clone()),
            lat: reference.and_then(|r| r.lat),
            lon: reference.and_then(|r| r.lon),
            population,
            confirmed,
            deaths,
            pop_factor: pop_factor(population, PER_100K),
            cases_per_100k,
            deaths_per_100k,
            death_rate: death_rate(deaths, confirmed, DEATH_RATE_DP),
            population_display: format_thousands(population.unwrap_or(0) as i64),
            confirmed_display: format_thousands(confirmed),
            deaths_display: format_thousands(deaths),
            cases_per_100k_display: format_thousands(cases_per_100k as i64),
            deaths_per_100k_display: format_thousands(deaths_per_100k as i64),
        }
    }
}

/// Roll the county aggregate up to one row per state, ordered by name.
#[instrument(level = "info", skip_all, fields(counties = county_aggregate.len()))]
pub fn state_aggregate(
    county_aggregate: &[CountyAggregateRow],
    state_reference: &StateReference,
) -> Result<StateAggregateTable> {
    let confirmed = sum_by(county_aggregate, |r| r.state.as_str(), |r| Some(r.confirmed));
    let deaths = sum_by(county_aggregate, |r| r.state.as_str(), |r| r.deaths);
    let totals = zip_sums(confirmed, &deaths);

    let joined = left_join(
        "state_aggregate.reference",
        &totals,
        &state_reference.rows,
        |t| t.0,
        |r| r.state.as_str(),
    );

    let mut dropped = 0usize;
    let mut rows = Vec::with_capacity(joined.pairs.len());
    for (&(state, confirmed, deaths), reference) in joined.pairs {
        if is_excluded_territory(state) {
            dropped += 1;
            continue;
        }
        rows.push(StateAggregateRow::new(
            state,
            confirmed,
            deaths.unwrap_or(0),
            reference,
        ));
    }

    debug!(dropped, "excluded territories after roll-up");
    info!(rows = rows.len(), "state aggregate built");
    Ok(Table::with_warnings(rows, joined.warning.into_iter().collect()))
}
