use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use super::{
    join::left_join,
    metrics::{death_rate, format_thousands, infection_rate, per_capita, pop_factor, PER_1000},
    reference::CountyReference,
    series::{SeriesKind, WideSeries},
    CountyAggregateTable, Table,
};
use crate::config::PopulationSource;
use crate::source::RawTable;

const DEATH_RATE_DP: u32 = 4;
const INFECTION_RATE_DP: u32 = 4;
const CASES_PER_1000_DP: u32 = 4;

/// Latest cumulative totals of one county.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyAggregateRow {
    pub state_fips: String,
    pub fips: String,
    pub county: String,
    pub state: String,
    pub county_state: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub confirmed: i64,
    /// `None` when the county has no row in the deaths series.
    pub deaths: Option<i64>,
    pub population: Option<u64>,
    pub death_rate: f64,
    pub infection_rate: f64,
    pub pop_factor: f64,
    pub cases_per_1000: f64,
    pub confirmed_display: String,
    pub deaths_display: String,
    pub population_display: String,
}

/// Totals as of the latest report date, one row per county of the
/// confirmed series, enriched with population and deaths.
#[instrument(level = "info", skip_all, fields(policy = ?population))]
pub fn county_aggregate(
    confirmed: &RawTable,
    deaths: &RawTable,
    county_reference: &CountyReference,
    population: PopulationSource,
) -> Result<CountyAggregateTable> {
    let conf = WideSeries::parse(confirmed, SeriesKind::Confirmed)
        .context("county aggregate: confirmed series")?;
    let dead = WideSeries::parse(deaths, SeriesKind::Deaths)
        .context("county aggregate: deaths series")?;
    let (conf_col, as_of) = conf.latest();
    let (dead_col, dead_as_of) = dead.latest();
    if as_of != dead_as_of {
        warn!(%as_of, %dead_as_of, "confirmed and deaths series end on different dates");
    }

    let mut warnings = Vec::new();

    // joins run over row indices; the series rows borrow the source table
    let conf_idx: Vec<usize> = (0..conf.rows.len()).collect();
    let dead_idx: Vec<usize> = (0..dead.rows.len()).collect();

    // reference population, keyed by county name and state name
    let with_pop = left_join(
        "county_aggregate.reference",
        &conf_idx,
        &county_reference.rows,
        |&i| (&*conf.rows[i].county, &*conf.rows[i].state),
        |r| (r.county.as_str(), r.state.as_str()),
    );
    warnings.extend(with_pop.warning);

    let with_deaths = left_join(
        "county_aggregate.deaths",
        &with_pop.pairs,
        &dead_idx,
        |&(&i, _)| {
            let c = &conf.rows[i];
            (&*c.state_fips, &*c.fips, &*c.county, &*c.state)
        },
        |&i| {
            let d = &dead.rows[i];
            (&*d.state_fips, &*d.fips, &*d.county, &*d.state)
        },
    );
    warnings.extend(with_deaths.warning);

    let mut rows = Vec::with_capacity(with_deaths.pairs.len());
    for (&(&ci, reference), dead_row) in with_deaths.pairs {
        let c = &conf.rows[ci];
        let confirmed_n = conf.value(ci, conf_col).unwrap_or(0);
        let deaths_n = dead_row.and_then(|&di| dead.value(di, dead_col));
        let pop = population.resolve(
            reference.and_then(|r| r.population),
            dead_row.and_then(|&di| dead.rows[di].population),
        );

        rows.push(CountyAggregateRow {
            state_fips: c.state_fips.to_string(),
            fips: c.fips.to_string(),
            county: c.county.to_string(),
            state: c.state.to_string(),
            county_state: c.county_state.to_string(),
            lat: c.lat.or_else(|| reference.and_then(|r| r.lat)),
            lon: c.lon.or_else(|| reference.and_then(|r| r.lon)),
            confirmed: confirmed_n,
            deaths: deaths_n,
            population: pop,
            death_rate: death_rate(deaths_n.unwrap_or(0), confirmed_n, DEATH_RATE_DP),
            infection_rate: infection_rate(confirmed_n, pop, INFECTION_RATE_DP),
            pop_factor: pop_factor(pop, PER_1000),
            cases_per_1000: per_capita(confirmed_n, pop, PER_1000, CASES_PER_1000_DP),
            confirmed_display: format_thousands(confirmed_n),
            deaths_display: deaths_n.map(format_thousands).unwrap_or_default(),
            population_display: format_thousands(pop.unwrap_or(0) as i64),
        });
    }

    info!(rows = rows.len(), %as_of, "county aggregate built");
    Ok(Table::with_warnings(rows, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Dataset;
    use crate::test_fixtures::{init_test_logging, raw};
    use crate::transform::fips::is_excluded_state_fips;
    use crate::transform::reference::load_county_reference;

    fn build(population: PopulationSource) -> CountyAggregateTable {
        let counties = load_county_reference(&raw(Dataset::CountyStats)).unwrap();
        county_aggregate(
            &raw(Dataset::Confirmed),
            &raw(Dataset::Deaths),
            &counties,
            population,
        )
        .unwrap()
    }

    fn find<'a>(t: &'a CountyAggregateTable, county: &str) -> &'a CountyAggregateRow {
        t.rows.iter().find(|r| r.county == county).unwrap()
    }

    #[test]
    fn latest_totals_and_rates() {
        init_test_logging();
        let t = build(PopulationSource::default());
        assert_eq!(t.len(), 5);
        assert!(t.warnings.is_empty());

        let autauga = find(&t, "Autauga");
        assert_eq!(autauga.fips, "01001");
        assert_eq!(autauga.state_fips, "01");
        assert_eq!(autauga.county_state, "Autauga, Alabama");
        assert_eq!(autauga.confirmed, 100);
        assert_eq!(autauga.deaths, Some(5));
        assert_eq!(autauga.population, Some(2000));
        assert_eq!(autauga.death_rate, 5.0);
        assert_eq!(autauga.cases_per_1000, 50.0);
        assert_eq!(autauga.infection_rate, 5.0);
        assert_eq!(autauga.pop_factor, 2.0);
        assert_eq!(autauga.population_display, "2,000");

        let adjuntas = find(&t, "Adjuntas");
        assert_eq!(adjuntas.death_rate, 33.3333);
        assert_eq!(adjuntas.cases_per_1000, 0.1765);
    }

    #[test]
    fn zero_counts_and_population_give_zero_rates() {
        let t = build(PopulationSource::default());
        let aleutians = find(&t, "Aleutians East");
        assert_eq!(aleutians.confirmed, 0);
        assert_eq!(aleutians.deaths, Some(0));
        assert_eq!(aleutians.death_rate, 0.0);
        assert_eq!(aleutians.cases_per_1000, 0.0);
        assert_eq!(aleutians.infection_rate, 0.0);
    }

    #[test]
    fn excluded_prefixes_never_appear() {
        let t = build(PopulationSource::default());
        assert!(t.rows.iter().all(|r| !is_excluded_state_fips(&r.state_fips)));
        assert!(t.rows.iter().all(|r| r.state != "Diamond Princess"));
    }

    #[test]
    fn population_policy_selects_source() {
        let fallback = build(PopulationSource::ReferenceThenSeries);
        assert_eq!(find(&fallback, "Bibb").population, Some(500));
        assert_eq!(find(&fallback, "Bibb").cases_per_1000, 16.0);

        let reference = build(PopulationSource::Reference);
        let bibb = find(&reference, "Bibb");
        assert_eq!(bibb.population, None);
        assert_eq!(bibb.cases_per_1000, 0.0);
        assert_eq!(bibb.population_display, "0");

        let series = build(PopulationSource::Series);
        assert_eq!(find(&series, "Autauga").population, Some(2100));
        assert_eq!(find(&series, "Autauga").cases_per_1000, 47.619);
    }

    #[test]
    fn county_missing_from_deaths_keeps_confirmed() {
        let counties = load_county_reference(&raw(Dataset::CountyStats)).unwrap();
        let mut deaths = raw(Dataset::Deaths);
        deaths.rows.retain(|r| r[5] != "Bibb");
        let t = county_aggregate(
            &raw(Dataset::Confirmed),
            &deaths,
            &counties,
            PopulationSource::Reference,
        )
        .unwrap();
        let bibb = find(&t, "Bibb");
        assert_eq!(bibb.confirmed, 8);
        assert_eq!(bibb.deaths, None);
        assert_eq!(bibb.death_rate, 0.0);
        assert_eq!(bibb.deaths_display, "");
    }

    #[test]
    fn duplicate_reference_rows_are_reported() {
        let mut counties = load_county_reference(&raw(Dataset::CountyStats)).unwrap();
        let dup = counties.rows[0].clone();
        counties.rows.push(dup);
        let t = county_aggregate(
            &raw(Dataset::Confirmed),
            &raw(Dataset::Deaths),
            &counties,
            PopulationSource::default(),
        )
        .unwrap();
        assert_eq!(t.len(), 6);
        assert_eq!(t.warnings.len(), 1);
        assert_eq!(t.warnings[0].join, "county_aggregate.reference");
        assert_eq!(t.warnings[0].left_rows, 5);
        assert_eq!(t.warnings[0].output_rows, 6);
    }
}
