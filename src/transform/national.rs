use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{info, instrument};

use super::{
    metrics::{
        death_rate, format_percent, format_thousands, infection_rate, per_capita, pop_factor,
        PER_100K,
    },
    rollup::{sum_by, zip_sums},
    state_ts::StateTimeSeriesRow,
    NationalTimeSeriesTable, Table,
};
use crate::error::EmptySourceError;

/// Counted in the national totals but left out of the population
/// denominator.
pub const DENOMINATOR_EXCLUDED_STATE: &str = "Puerto Rico";

const PER_100K_DP: u32 = 1;
const DEATH_RATE_DP: u32 = 6;
const INFECTION_RATE_DP: u32 = 6;

/// Country-wide totals on one report date.
#[derive(Debug, Clone, PartialEq)]
pub struct NationalTimeSeriesRow {
    pub date: NaiveDate,
    pub confirmed: i64,
    pub deaths: i64,
    pub population: u64,
    pub pop_factor: f64,
    pub cases_per_100k: f64,
    pub deaths_per_100k: f64,
    pub death_rate: f64,
    pub infection_rate: f64,
}

/// The most recent national row with its display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct NationalSnapshotRow {
    pub row: NationalTimeSeriesRow,
    pub population_display: String,
    pub confirmed_display: String,
    pub deaths_display: String,
    pub cases_per_100k_display: String,
    pub deaths_per_100k_display: String,
    pub death_rate_display: String,
}

/// Sum over states of each state's largest observed population.
fn national_population(state_time_series: &[StateTimeSeriesRow]) -> u64 {
    let mut max_by_state: BTreeMap<&str, u64> = BTreeMap::new();
    for r in state_time_series {
        if r.state == DENOMINATOR_EXCLUDED_STATE {
            continue;
        }
        if let Some(p) = r.population {
            let m = max_by_state.entry(r.state.as_str()).or_insert(0);
            *m = (*m).max(p);
        }
    }
    max_by_state.values().sum()
}

/// Roll the state time series up to one row per date.
#[instrument(level = "info", skip_all, fields(state_rows = state_time_series.len()))]
pub fn national_time_series(
    state_time_series: &[StateTimeSeriesRow],
) -> Result<NationalTimeSeriesTable> {
    let confirmed = sum_by(state_time_series, |r| r.date, |r| Some(r.confirmed));
    let deaths = sum_by(state_time_series, |r| r.date, |r| Some(r.deaths));
    let population = national_population(state_time_series);
    if state_time_series
        .iter()
        .any(|r| r.state == DENOMINATOR_EXCLUDED_STATE)
    {
        info!(
            state = DENOMINATOR_EXCLUDED_STATE,
            "counts included in national totals, population excluded from denominator"
        );
    }

    let pop = Some(population);
    let rows: Vec<NationalTimeSeriesRow> = zip_sums(confirmed, &deaths)
        .into_iter()
        .map(|(date, confirmed, deaths)| {
            let deaths = deaths.unwrap_or(0);
            NationalTimeSeriesRow {
                date,
                confirmed,
                deaths,
                population,
                pop_factor: pop_factor(pop, PER_100K),
                cases_per_100k: per_capita(confirmed, pop, PER_100K, PER_100K_DP),
                deaths_per_100k: per_capita(deaths, pop, PER_100K, PER_100K_DP),
                death_rate: death_rate(deaths, confirmed, DEATH_RATE_DP),
                infection_rate: infection_rate(confirmed, pop, INFECTION_RATE_DP),
            }
        })
        .collect();

    info!(rows = rows.len(), population, "national time series built");
    Ok(Table::new(rows))
}

/// The national row with the latest date. Errors on an empty series.
pub fn latest_national_snapshot(
    national_time_series: &[NationalTimeSeriesRow],
) -> Result<NationalSnapshotRow> {
    let latest = national_time_series
        .iter()
        .max_by_key(|r| r.date)
        .ok_or_else(|| EmptySourceError("national time series".to_string()))?;

    Ok(NationalSnapshotRow {
        row: latest.clone(),
        population_display: format_thousands(latest.population as i64),
        confirmed_display: format_thousands(latest.confirmed),
        deaths_display: format_thousands(latest.deaths),
        cases_per_100k_display: format_thousands(latest.cases_per_100k as i64),
        deaths_per_100k_display: format_thousands(latest.deaths_per_100k as i64),
        death_rate_display: format_percent(latest.death_rate),
    })
}
