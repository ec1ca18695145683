// src/transform/mod.rs

pub mod county_agg;
pub mod county_ts;
pub mod fips;
pub mod join;
pub mod metrics;
pub mod national;
pub mod reference;
pub mod rollup;
pub mod series;
pub mod state_agg;
pub mod state_ts;

pub use county_agg::{county_aggregate, CountyAggregateRow};
pub use county_ts::{county_time_series, CountyTimeSeriesRow};
pub use national::{
    latest_national_snapshot, national_time_series, NationalSnapshotRow, NationalTimeSeriesRow,
};
pub use reference::{
    load_county_reference, load_state_reference, CountyReference, ReferenceTables,
    StateReference,
};
pub use state_agg::{state_aggregate, StateAggregateRow};
pub use state_ts::{state_time_series, StateTimeSeriesRow};

use crate::error::JoinCardinalityWarning;

/// Rows of one derived table plus the join warnings raised building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    pub rows: Vec<R>,
    pub warnings: Vec<JoinCardinalityWarning>,
}

impl<R> Table<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(rows: Vec<R>, warnings: Vec<JoinCardinalityWarning>) -> Self {
        Self { rows, warnings }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub type CountyAggregateTable = Table<CountyAggregateRow>;
pub type CountyTimeSeriesTable = Table<CountyTimeSeriesRow>;
pub type StateAggregateTable = Table<StateAggregateRow>;
pub type StateTimeSeriesTable = Table<StateTimeSeriesRow>;
pub type NationalTimeSeriesTable = Table<NationalTimeSeriesRow>;
