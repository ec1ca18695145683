// src/pipeline.rs

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::config::{PipelineConfig, PopulationSource};
use crate::error::JoinCardinalityWarning;
use crate::source::{Dataset, RawTable, TableSource};
use crate::transform::{
    county_aggregate, county_time_series, latest_national_snapshot, national_time_series,
    state_aggregate, state_time_series, CountyAggregateTable, CountyTimeSeriesTable,
    NationalSnapshotRow, NationalTimeSeriesTable, ReferenceTables, StateAggregateTable,
    StateTimeSeriesTable,
};

/// The four raw inputs of one run, owned by that run.
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    pub confirmed: RawTable,
    pub deaths: RawTable,
    pub states: RawTable,
    pub counties: RawTable,
}

impl Inputs {
    pub fn load(source: &dyn TableSource) -> Result<Self> {
        Ok(Self {
            confirmed: source.load(Dataset::Confirmed)?,
            deaths: source.load(Dataset::Deaths)?,
            states: source.load(Dataset::StateStats)?,
            counties: source.load(Dataset::CountyStats)?,
        })
    }
}

/// Every derived table of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub references: ReferenceTables,
    pub county_aggregate: CountyAggregateTable,
    pub county_time_series: CountyTimeSeriesTable,
    pub state_aggregate: StateAggregateTable,
    pub state_time_series: StateTimeSeriesTable,
    pub national_time_series: NationalTimeSeriesTable,
    pub national_snapshot: NationalSnapshotRow,
}

impl PipelineOutput {
    /// Join warnings of all tables, in build order.
    pub fn warnings(&self) -> Vec<&JoinCardinalityWarning> {
        self.county_aggregate
            .warnings
            .iter()
            .chain(&self.county_time_series.warnings)
            .chain(&self.state_aggregate.warnings)
            .chain(&self.state_time_series.warnings)
            .chain(&self.national_time_series.warnings)
            .collect()
    }
}

/// Build all tables from loaded inputs. Inputs are only borrowed.
#[instrument(level = "info", skip(inputs))]
pub fn run(inputs: &Inputs, population: PopulationSource) -> Result<PipelineOutput> {
    // ─── 1) Reference tables ───
    let references = ReferenceTables::load(&inputs.states, &inputs.counties)
        .context("loading reference tables")?;

    // ─── 2) County level ───
    let county_agg = county_aggregate(
        &inputs.confirmed,
        &inputs.deaths,
        &references.counties,
        population,
    )
    .context("building county aggregate")?;
    let county_ts = county_time_series(
        &inputs.confirmed,
        &inputs.deaths,
        &references.counties,
        population,
    )
    .context("building county time series")?;

    // ─── 3) State level ───
    let state_agg = state_aggregate(&county_agg.rows, &references.states)
        .context("building state aggregate")?;
    let state_ts = state_time_series(&county_ts.rows, &references.states)
        .context("building state time series")?;

    // ─── 4) National level ───
    let national = national_time_series(&state_ts.rows).context("building national series")?;
    let snapshot = latest_national_snapshot(&national.rows)?;

    let out = PipelineOutput {
        references,
        county_aggregate: county_agg,
        county_time_series: county_ts,
        state_aggregate: state_agg,
        state_time_series: state_ts,
        national_time_series: national,
        national_snapshot: snapshot,
    };

    let warnings = out.warnings();
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "run finished with join cardinality warnings");
    }
    info!(
        as_of = %out.national_snapshot.row.date,
        confirmed = out.national_snapshot.row.confirmed,
        deaths = out.national_snapshot.row.deaths,
        "pipeline complete"
    );
    Ok(out)
}

/// Load inputs from `source` and run with the configured policy.
pub fn run_from_source(source: &dyn TableSource, config: &PipelineConfig) -> Result<PipelineOutput> {
    let inputs = Inputs::load(source).context("loading inputs")?;
    run(&inputs, config.county_population)
}
