use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};

use super::{
    join::{check_cardinality, index_by},
    metrics::{death_rate, infection_rate, per_capita, pop_factor, PER_1000},
    reference::CountyReference,
    series::{SeriesKind, WideSeries},
    CountyTimeSeriesTable, Table,
};
use crate::config::PopulationSource;
use crate::source::RawTable;

const DEATH_RATE_DP: u32 = 6;
const INFECTION_RATE_DP: u32 = 6;
const CASES_PER_1000_DP: u32 = 4;

/// One county on one report date.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyTimeSeriesRow {
    pub state_fips: Arc<str>,
    pub fips: Arc<str>,
    pub state: Arc<str>,
    pub county: Arc<str>,
    pub county_state: Arc<str>,
    pub date: NaiveDate,
    pub confirmed: i64,
    /// `None` when no deaths row matched this county and date.
    pub deaths: Option<i64>,
    /// Resolved with the same policy as the county aggregate.
    pub population: Option<u64>,
    pub death_rate: f64,
    pub infection_rate: f64,
    pub pop_factor: f64,
    pub cases_per_1000: f64,
}

/// Per-county daily history: both series melted to long form and joined
/// on (FIPS, state, county, date).
///
/// The deaths side is never materialized: an identity index plus a
/// date-to-column map resolve each confirmed row's match directly from the
/// wide table, which is equivalent to joining against its melted form.
/// Population is resolved per county with `population`, so the latest row
/// of every county agrees with the county aggregate.
#[instrument(level = "info", skip_all, fields(policy = ?population))]
pub fn county_time_series(
    confirmed: &RawTable,
    deaths: &RawTable,
    county_reference: &CountyReference,
    population: PopulationSource,
) -> Result<CountyTimeSeriesTable> {
    let conf = WideSeries::parse(confirmed, SeriesKind::Confirmed)
        .context("county time series: confirmed series")?;
    let dead = WideSeries::parse(deaths, SeriesKind::Deaths)
        .context("county time series: deaths series")?;

    let dead_by_identity = index_by(&dead.rows, |d| (&*d.fips, &*d.state, &*d.county));
    let dead_col_by_date: HashMap<NaiveDate, usize> =
        dead.dates.iter().map(|&(col, date)| (date, col)).collect();
    let reference_by_name = index_by(&county_reference.rows, |r| {
        (r.county.as_str(), r.state.as_str())
    });

    // (reference, deaths series) population per confirmed row; first match wins
    let county_pops: Vec<(Option<u64>, Option<u64>)> = conf
        .rows
        .iter()
        .map(|c| {
            let reference = reference_by_name
                .get(&(&*c.county, &*c.state))
                .and_then(|m| m.first())
                .and_then(|&i| county_reference.rows[i].population);
            let series = dead_by_identity
                .get(&(&*c.fips, &*c.state, &*c.county))
                .and_then(|m| m.first())
                .and_then(|&di| dead.rows[di].population);
            (reference, series)
        })
        .collect();

    let mut rows = Vec::with_capacity(conf.long_len());
    for long in conf.melt() {
        let c = &conf.rows[long.series];
        let (reference_pop, series_pop) = county_pops[long.series];
        let confirmed_n = long.value.unwrap_or(0);

        let matches = dead_col_by_date.get(&long.date).and_then(|&col| {
            dead_by_identity
                .get(&(&*c.fips, &*c.state, &*c.county))
                .map(|m| (col, m))
        });
        let deaths_side: Vec<(Option<i64>, Option<u64>)> = match matches {
            Some((col, m)) => m
                .iter()
                .map(|&di| {
                    let pop = population.resolve(reference_pop, dead.rows[di].population);
                    (dead.value(di, col), pop)
                })
                .collect(),
            None => vec![(None, population.resolve(reference_pop, series_pop))],
        };

        for (deaths_n, pop) in deaths_side {
            rows.push(CountyTimeSeriesRow {
                state_fips: c.state_fips.clone(),
                fips: c.fips.clone(),
                state: c.state.clone(),
                county: c.county.clone(),
                county_state: c.county_state.clone(),
                date: long.date,
                confirmed: confirmed_n,
                deaths: deaths_n,
                population: pop,
                death_rate: death_rate(deaths_n.unwrap_or(0), confirmed_n, DEATH_RATE_DP),
                infection_rate: infection_rate(confirmed_n, pop, INFECTION_RATE_DP),
                pop_factor: pop_factor(pop, PER_1000),
                cases_per_1000: per_capita(confirmed_n, pop, PER_1000, CASES_PER_1000_DP),
            });
        }
    }

    let warnings: Vec<_> =
        check_cardinality("county_time_series.deaths", conf.long_len(), rows.len())
            .into_iter()
            .collect();

    info!(
        rows = rows.len(),
        counties = conf.rows.len(),
        dates = conf.dates.len(),
        "county time series built"
    );
    Ok(Table::with_warnings(rows, warnings))
}
