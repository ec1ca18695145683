use arrow::{array::ArrayRef, datatypes::Schema as ArrowSchema};

use super::{
    columns as col, date32, dates, f64s, float64, i64s, int64, opt_f64s, opt_i64s, opt_strings,
    opt_u64s, strings, u64s, uint64, utf8, TableRow,
};
use crate::transform::{
    CountyAggregateRow, CountyTimeSeriesRow, NationalSnapshotRow, NationalTimeSeriesRow,
    StateAggregateRow, StateTimeSeriesRow,
};

impl TableRow for CountyAggregateRow {
    const TABLE: &'static str = "county_aggregate";

    fn schema() -> ArrowSchema {
        ArrowSchema::new(vec![
            utf8(col::STATE_FIPS, false),
            utf8(col::FIPS, false),
            utf8(col::COUNTY, false),
            utf8(col::STATE, false),
            utf8(col::COUNTY_STATE, false),
            float64(col::COUNTY_LAT, true),
            float64(col::COUNTY_LON, true),
            int64(col::CONFIRMED_RAW, false),
            int64(col::DEATHS_RAW, true),
            uint64(col::POPULATION, true),
            float64(col::DEATH_RATE, false),
            float64(col::INFECTION_RATE, false),
            float64(col::POP_FACTOR, false),
            float64(col::CASES_PER_1000, false),
            utf8(col::CONFIRMED_CASES, false),
            utf8(col::DEATHS, false),
            utf8(col::EST_POP, false),
        ])
    }

    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows, |r| r.state_fips.as_str()),
            strings(rows, |r| r.fips.as_str()),
            strings(rows, |r| r.county.as_str()),
            strings(rows, |r| r.state.as_str()),
            strings(rows, |r| r.county_state.as_str()),
            opt_f64s(rows, |r| r.lat),
            opt_f64s(rows, |r| r.lon),
            i64s(rows, |r| r.confirmed),
            opt_i64s(rows, |r| r.deaths),
            opt_u64s(rows, |r| r.population),
            f64s(rows, |r| r.death_rate),
            f64s(rows, |r| r.infection_rate),
            f64s(rows, |r| r.pop_factor),
            f64s(rows, |r| r.cases_per_1000),
            strings(rows, |r| r.confirmed_display.as_str()),
            strings(rows, |r| r.deaths_display.as_str()),
            strings(rows, |r| r.population_display.as_str()),
        ]
    }
}

impl TableRow for CountyTimeSeriesRow {
    const TABLE: &'static str = "county_time_series";

    fn schema() -> ArrowSchema {
        ArrowSchema::new(vec![
            utf8(col::STATE_FIPS, false),
            utf8(col::FIPS, false),
            utf8(col::STATE, false),
            utf8(col::COUNTY, false),
            utf8(col::COUNTY_STATE, false),
            date32(col::DATE),
            int64(col::CONFIRMED_CASES, false),
            int64(col::DEATHS, true),
            uint64(col::POPULATION, true),
            float64(col::DEATH_RATE, false),
            float64(col::INFECTION_RATE, false),
            float64(col::POP_FACTOR, false),
            float64(col::CASES_PER_1000, false),
        ])
    }

    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows, |r| &*r.state_fips),
            strings(rows, |r| &*r.fips),
            strings(rows, |r| &*r.state),
            strings(rows, |r| &*r.county),
            strings(rows, |r| &*r.county_state),
            dates(rows, |r| r.date),
            i64s(rows, |r| r.confirmed),
            opt_i64s(rows, |r| r.deaths),
            opt_u64s(rows, |r| r.population),
            f64s(rows, |r| r.death_rate),
            f64s(rows, |r| r.infection_rate),
            f64s(rows, |r| r.pop_factor),
            f64s(rows, |r| r.cases_per_1000),
        ]
    }
}

impl TableRow for StateAggregateRow {
    const TABLE: &'static str = "state_aggregate";

    fn schema() -> ArrowSchema {
        ArrowSchema::new(vec![
            utf8(col::STATE, false),
            utf8(col::STATE_FIPS, true),
            utf8(col::CODE, true),
            utf8(col::UNION_STATUS, true),
            float64(col::STATE_LAT, true),
            float64(col::STATE_LON, true),
            uint64(col::POPULATION, true),
            int64(col::CONFIRMED_RAW, false),
            int64(col::DEATHS_RAW, false),
            float64(col::POP_FACTOR, false),
            float64(col::CC_PER_100K, false),
            float64(col::D_PER_100K, false),
            float64(col::DEATH_RATE, false),
            utf8(col::STATE_EST_POP, false),
            utf8(col::CONFIRMED_CASES, false),
            utf8(col::DEATHS, false),
            utf8(col::CASES_PER_100K, false),
            utf8(col::DEATHS_PER_100K, false),
        ])
    }

    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows, |r| r.state.as_str()),
            opt_strings(rows, |r| r.state_fips.as_deref()),
            opt_strings(rows, |r| r.code.as_deref()),
            opt_strings(rows, |r| r.union_status.as_deref()),
            opt_f64s(rows, |r| r.lat),
            opt_f64s(rows, |r| r.lon),
            opt_u64s(rows, |r| r.population),
            i64s(rows, |r| r.confirmed),
            i64s(rows, |r| r.deaths),
            f64s(rows, |r| r.pop_factor),
            f64s(rows, |r| r.cases_per_100k),
            f64s(rows, |r| r.deaths_per_100k),
            f64s(rows, |r| r.death_rate),
            strings(rows, |r| r.population_display.as_str()),
            strings(rows, |r| r.confirmed_display.as_str()),
            strings(rows, |r| r.deaths_display.as_str()),
            strings(rows, |r| r.cases_per_100k_display.as_str()),
            strings(rows, |r| r.deaths_per_100k_display.as_str()),
        ]
    }
}

impl TableRow for StateTimeSeriesRow {
    const TABLE: &'static str = "state_time_series";

    fn schema() -> ArrowSchema {
        ArrowSchema::new(vec![
            utf8(col::STATE, false),
            date32(col::DATE),
            utf8(col::STATE_FIPS, true),
            utf8(col::CODE, true),
            utf8(col::UNION_STATUS, true),
            float64(col::STATE_LAT, true),
            float64(col::STATE_LON, true),
            uint64(col::POPULATION, true),
            int64(col::CONFIRMED_CASES, false),
            int64(col::DEATHS, false),
            float64(col::POP_FACTOR, false),
            float64(col::CASES_PER_100K, false),
            float64(col::DEATHS_PER_100K, false),
            float64(col::DEATH_RATE, false),
            float64(col::INFECTION_RATE, false),
        ])
    }

    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows, |r| r.state.as_str()),
            dates(rows, |r| r.date),
            opt_strings(rows, |r| r.state_fips.as_deref()),
            opt_strings(rows, |r| r.code.as_deref()),
            opt_strings(rows, |r| r.union_status.as_deref()),
            opt_f64s(rows, |r| r.lat),
            opt_f64s(rows, |r| r.lon),
            opt_u64s(rows, |r| r.population),
            i64s(rows, |r| r.confirmed),
            i64s(rows, |r| r.deaths),
            f64s(rows, |r| r.pop_factor),
            f64s(rows, |r| r.cases_per_100k),
            f64s(rows, |r| r.deaths_per_100k),
            f64s(rows, |r| r.death_rate),
            f64s(rows, |r| r.infection_rate),
        ]
    }
}

impl TableRow for NationalTimeSeriesRow {
    const TABLE: &'static str = "national_time_series";

    fn schema() -> ArrowSchema {
        ArrowSchema::new(vec![
            date32(col::DATE),
            int64(col::CONFIRMED_CASES, false),
            int64(col::DEATHS, false),
            uint64(col::POPULATION, false),
            float64(col::POP_FACTOR, false),
            float64(col::CONFIRMED_PER_100K, false),
            float64(col::DEATHS_PER_100K, false),
            float64(col::DEATH_RATE, false),
            float64(col::INFECTION_RATE, false),
        ])
    }

    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            dates(rows, |r| r.date),
            i64s(rows, |r| r.confirmed),
            i64s(rows, |r| r.deaths),
            u64s(rows, |r| r.population),
            f64s(rows, |r| r.pop_factor),
            f64s(rows, |r| r.cases_per_100k),
            f64s(rows, |r| r.deaths_per_100k),
            f64s(rows, |r| r.death_rate),
            f64s(rows, |r| r.infection_rate),
        ]
    }
}

/// Display-only: the numeric values stay in `national_time_series`.
impl TableRow for NationalSnapshotRow {
    const TABLE: &'static str = "national_snapshot";

    fn schema() -> ArrowSchema {
        ArrowSchema::new(vec![
            date32(col::DATE),
            utf8(col::US_POPULATION, false),
            utf8(col::CONFIRMED_CASES, false),
            utf8(col::DEATHS, false),
            utf8(col::CASES_PER_100K, false),
            utf8(col::DEATHS_PER_100K, false),
            utf8(col::DEATH_RATE_DISPLAY, false),
        ])
    }

    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            dates(rows, |r| r.row.date),
            strings(rows, |r| r.population_display.as_str()),
            strings(rows, |r| r.confirmed_display.as_str()),
            strings(rows, |r| r.deaths_display.as_str()),
            strings(rows, |r| r.cases_per_100k_display.as_str()),
            strings(rows, |r| r.deaths_per_100k_display.as_str()),
            strings(rows, |r| r.death_rate_display.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PopulationSource;
    use crate::source::Dataset;
    use crate::test_fixtures::raw;
    use crate::transform::{
        county_aggregate, county_time_series, load_county_reference, CountyReference,
    };
    use arrow::array::{Array, Date32Array, Int64Array, StringArray};

    #[test]
    fn county_aggregate_batch_matches_schema() {
        let counties = load_county_reference(&raw(Dataset::CountyStats)).unwrap();
        let t = county_aggregate(
            &raw(Dataset::Confirmed),
            &raw(Dataset::Deaths),
            &counties,
            PopulationSource::default(),
        )
        .unwrap();
        let batch = CountyAggregateRow::to_batch(&t.rows).unwrap();
        assert_eq!(batch.num_rows(), 5);
        assert_eq!(batch.num_columns(), 17);

        let fips = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(fips.value(0), "01001");
        let confirmed = batch
            .column_by_name("confirmed")
            .unwrap()
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(confirmed.value(0), 100);
    }

    #[test]
    fn missing_deaths_are_null() {
        let mut deaths = raw(Dataset::Deaths);
        deaths.rows.retain(|r| r[5] != "Bibb");
        let t = county_time_series(
            &raw(Dataset::Confirmed),
            &deaths,
            &CountyReference::default(),
            PopulationSource::default(),
        )
        .unwrap();
        let batch = CountyTimeSeriesRow::to_batch(&t.rows).unwrap();
        let deaths_col = batch.column_by_name("Deaths").unwrap();
        // Bibb on each of the three dates
        assert_eq!(deaths_col.null_count(), 3);

        let dates = batch
            .column_by_name("Date")
            .unwrap()
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        assert_eq!(
            dates.value_as_date(0),
            chrono::NaiveDate::from_ymd_opt(2020, 1, 22)
        );
    }
}
