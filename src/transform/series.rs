use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use super::fips::{
    is_excluded_state_fips, is_excluded_territory, normalize_fips, state_prefix, COUNTY_FIPS_WIDTH,
};
use crate::error::MissingColumnError;
use crate::source::{
    cell, opt_cell,
    utils::{clean_str, parse_count, parse_float, parse_population},
    RawTable,
};

pub mod columns {
    pub const FIPS: &str = "FIPS";
    pub const COUNTY: &str = "Admin2";
    pub const STATE: &str = "Province_State";
    pub const LAT: &str = "Lat";
    pub const LON: &str = "Long_";
    pub const COMBINED_KEY: &str = "Combined_Key";
    pub const POPULATION: &str = "Population";
}

/// Which wide series a table is; the deaths series must carry population.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeriesKind {
    Confirmed,
    Deaths,
}

/// Identity columns of one kept county row of a wide series.
///
/// Strings are shared so the long form can repeat them per date cheaply.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesIdentity {
    pub fips: Arc<str>,
    pub state_fips: Arc<str>,
    pub county: Arc<str>,
    pub state: Arc<str>,
    pub county_state: Arc<str>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub population: Option<u64>,
    /// Row index in the source table.
    source_row: usize,
}

/// One melted cell: a county row, a report date and its cumulative value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongRow {
    pub series: usize,
    pub date: NaiveDate,
    pub value: Option<i64>,
}

/// A wide county series (one column per report date) with non-county rows
/// and excluded territories already dropped. Borrows the source table;
/// never mutates it.
pub struct WideSeries<'a> {
    raw: &'a RawTable,
    pub rows: Vec<SeriesIdentity>,
    /// `(column index, date)`, ascending by date.
    pub dates: Vec<(usize, NaiveDate)>,
    latest: (usize, NaiveDate),
}

impl<'a> WideSeries<'a> {
    pub fn parse(raw: &'a RawTable, kind: SeriesKind) -> Result<Self> {
        let fips_col = raw.require(columns::FIPS)?;
        let county_col = raw.require(columns::COUNTY)?;
        let state_col = raw.require(columns::STATE)?;
        let pop_col = match kind {
            SeriesKind::Deaths => Some(raw.require(columns::POPULATION)?),
            SeriesKind::Confirmed => raw.column_index(columns::POPULATION),
        };
        let lat_col = raw.column_index(columns::LAT);
        let lon_col = raw.column_index(columns::LON);
        let key_col = raw.column_index(columns::COMBINED_KEY);

        let dates = raw.date_columns();
        let latest = dates
            .last()
            .copied()
            .ok_or_else(|| MissingColumnError::new(&raw.name, "<report date>"))?;

        let mut rows = Vec::with_capacity(raw.len());
        let mut excluded = 0usize;
        for (i, r) in raw.rows.iter().enumerate() {
            let fips = normalize_fips(cell(r, fips_col), COUNTY_FIPS_WIDTH);
            let state_fips = state_prefix(&fips).to_string();
            let state = clean_str(cell(r, state_col));
            if is_excluded_state_fips(&state_fips) || is_excluded_territory(state) {
                excluded += 1;
                continue;
            }
            let county = clean_str(cell(r, county_col));
            let county_state = county_state_label(opt_cell(r, key_col), county, state);

            rows.push(SeriesIdentity {
                fips: fips.into(),
                state_fips: state_fips.into(),
                county: county.into(),
                state: state.into(),
                county_state: county_state.into(),
                lat: parse_float(opt_cell(r, lat_col)),
                lon: parse_float(opt_cell(r, lon_col)),
                population: parse_population(opt_cell(r, pop_col)),
                source_row: i,
            });
        }

        debug!(
            table = %raw.name,
            kept = rows.len(),
            excluded,
            dates = dates.len(),
            "parsed wide series"
        );
        Ok(Self {
            raw,
            rows,
            dates,
            latest,
        })
    }

    /// The most recent report date and its column.
    pub fn latest(&self) -> (usize, NaiveDate) {
        self.latest
    }

    /// Value of kept row `series` in source column `col`.
    pub fn value(&self, series: usize, col: usize) -> Option<i64> {
        let row = &self.raw.rows[self.rows[series].source_row];
        parse_count(cell(row, col))
    }

    /// Wide → long: one [`LongRow`] per (date, county), date-major in
    /// ascending date order, counties in source order within a date.
    pub fn melt(&self) -> impl Iterator<Item = LongRow> + '_ {
        self.dates.iter().flat_map(move |&(col, date)| {
            (0..self.rows.len()).map(move |series| LongRow {
                series,
                date,
                value: self.value(series, col),
            })
        })
    }

    pub fn long_len(&self) -> usize {
        self.rows.len() * self.dates.len()
    }
}

/// `"Autauga, Alabama, US"` → `"Autauga, Alabama"`; without a combined
/// key, `"<county>, <state>"`.
fn county_state_label(combined_key: &str, county: &str, state: &str) -> String {
    let key = clean_str(combined_key);
    if key.is_empty() {
        format!("{}, {}", county, state)
    } else {
        key.replace(", US", "").replace(",US", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Dataset;
    use crate::test_fixtures::raw;

    #[test]
    fn excludes_non_county_prefixes() {
        let t = raw(Dataset::Confirmed);
        let s = WideSeries::parse(&t, SeriesKind::Confirmed).unwrap();
        assert_eq!(s.rows.len(), 5);
        assert!(s
            .rows
            .iter()
            .all(|r| !is_excluded_state_fips(&r.state_fips)));
        assert_eq!(&*s.rows[0].fips, "01001");
        assert_eq!(&*s.rows[0].county_state, "Autauga, Alabama");
    }

    #[test]
    fn excludes_territory_counties_by_name() {
        let mut t = raw(Dataset::Confirmed);
        t.rows.push(
            [
                "31666010", "GU", "GUM", "316", "66010.0", "Yigo", "Guam", "US", "13.53",
                "144.88", "Yigo, Guam, US", "1", "2", "3",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        );
        let s = WideSeries::parse(&t, SeriesKind::Confirmed).unwrap();
        assert_eq!(s.rows.len(), 5);
        assert!(s.rows.iter().all(|r| &*r.state != "Guam"));
    }

    #[test]
    fn latest_is_greatest_date() {
        let t = raw(Dataset::Deaths);
        let s = WideSeries::parse(&t, SeriesKind::Deaths).unwrap();
        assert_eq!(s.latest(), *s.dates.last().unwrap());
        assert_eq!(s.latest().1, NaiveDate::from_ymd_opt(2020, 1, 24).unwrap());

        let no_dates = RawTable::new("x", t.headers[..12].to_vec(), vec![]);
        let err = WideSeries::parse(&no_dates, SeriesKind::Deaths).err().unwrap();
        assert_eq!(
            err.downcast_ref::<MissingColumnError>().unwrap().column,
            "<report date>"
        );
    }

    #[test]
    fn melt_is_date_major() {
        let t = raw(Dataset::Confirmed);
        let s = WideSeries::parse(&t, SeriesKind::Confirmed).unwrap();
        let long: Vec<LongRow> = s.melt().collect();
        assert_eq!(long.len(), s.long_len());
        assert_eq!(long.len(), 15);
        assert!(long.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(long[0].series, 0);
        assert_eq!(long[5].series, 0);
        assert_eq!(long[14].value, Some(3));
    }

    #[test]
    fn deaths_series_requires_population() {
        let t = raw(Dataset::Confirmed);
        let err = WideSeries::parse(&t, SeriesKind::Deaths)
            .err()
            .unwrap();
        assert_eq!(
            err.downcast_ref::<MissingColumnError>().unwrap().column,
            "Population"
        );
    }

    #[test]
    fn label_without_combined_key() {
        assert_eq!(county_state_label("", "Bibb", "Alabama"), "Bibb, Alabama");
        assert_eq!(
            county_state_label("Bibb, Alabama,US", "Bibb", "Alabama"),
            "Bibb, Alabama"
        );
    }
}
