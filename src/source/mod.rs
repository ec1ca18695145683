// src/source/mod.rs

pub mod dates;
mod raw_table;
pub mod utils;

use anyhow::{Context, Result};
use serde_json::{Number, Value};
use std::{collections::HashSet, path::PathBuf};
use tracing::info;

pub use raw_table::{cell, opt_cell, RawTable};

use crate::config::{CollectionNames, FileNames};
use crate::error::EmptySourceError;
use crate::store::{DocumentStore, Record, ID_KEY};

/// The four inputs of a pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dataset {
    Confirmed,
    Deaths,
    StateStats,
    CountyStats,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Confirmed,
        Dataset::Deaths,
        Dataset::StateStats,
        Dataset::CountyStats,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Dataset::Confirmed => "confirmed",
            Dataset::Deaths => "deaths",
            Dataset::StateStats => "states_stats",
            Dataset::CountyStats => "counties_stats",
        }
    }
}

/// Something that can hand the pipeline one raw input table.
pub trait TableSource {
    fn load(&self, dataset: Dataset) -> Result<RawTable>;
}

/// Inputs read from CSV files in one directory.
pub struct CsvDirSource {
    dir: PathBuf,
    files: FileNames,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>, files: FileNames) -> Self {
        Self {
            dir: dir.into(),
            files,
        }
    }

    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        self.dir.join(self.files.get(dataset))
    }
}

impl TableSource for CsvDirSource {
    fn load(&self, dataset: Dataset) -> Result<RawTable> {
        let path = self.path_for(dataset);
        let table = RawTable::from_csv_path(&path)
            .with_context(|| format!("loading {} from {}", dataset.as_str(), path.display()))?;
        if table.is_empty() {
            return Err(EmptySourceError(path.display().to_string()).into());
        }
        info!(dataset = dataset.as_str(), rows = table.len(), "loaded CSV");
        Ok(table)
    }
}

/// Inputs read through a borrowed document-store handle.
pub struct StoreSource<'a, S: DocumentStore> {
    store: &'a S,
    collections: CollectionNames,
}

impl<'a, S: DocumentStore> StoreSource<'a, S> {
    pub fn new(store: &'a S, collections: CollectionNames) -> Self {
        Self { store, collections }
    }
}

impl<S: DocumentStore> TableSource for StoreSource<'_, S> {
    fn load(&self, dataset: Dataset) -> Result<RawTable> {
        let collection = self.collections.get(dataset);
        let records = self
            .store
            .read_all(collection)
            .with_context(|| format!("reading collection {}", collection))?;
        if records.is_empty() {
            return Err(EmptySourceError(collection.to_string()).into());
        }
        let table = table_from_records(collection, &records);
        info!(dataset = dataset.as_str(), collection, rows = table.len(), "loaded collection");
        Ok(table)
    }
}

/// Flatten store documents into a string table. Columns are the keys in
/// first-seen order, minus the store's `_id`.
pub fn table_from_records(name: &str, records: &[Record]) -> RawTable {
    let mut headers: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for rec in records {
        for key in rec.keys() {
            if key != ID_KEY && seen.insert(key.as_str()) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|rec| {
            headers
                .iter()
                .map(|h| rec.get(h).map(value_to_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    RawTable::new(name, headers, rows)
}

fn value_to_cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn a string table into store documents, typing numeric cells as JSON
/// numbers and blank cells as null.
pub fn records_from_table(table: &RawTable) -> Vec<Record> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), cell_to_value(cell(row, i))))
                .collect()
        })
        .collect()
}

fn cell_to_value(raw: &str) -> Value {
    let s = utils::clean_str(raw);
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::from(i);
    }
    if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_fixtures;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn records_round_trip_keeps_column_order() {
        let raw = RawTable::from_csv_reader(
            "confirmed_ts",
            "FIPS,Admin2,Province_State,1/22/20,1/23/20\n1001.0,Autauga,Alabama,0,\n".as_bytes(),
        )
        .unwrap();
        let records = records_from_table(&raw);
        assert_eq!(records[0]["FIPS"], json!(1001.0));
        assert_eq!(records[0]["1/22/20"], json!(0));
        assert_eq!(records[0]["1/23/20"], Value::Null);

        let back = table_from_records("confirmed_ts", &records);
        assert_eq!(back.headers, raw.headers);
        assert_eq!(back.rows[0][1], "Autauga");
        assert_eq!(back.rows[0][4], "");
    }

    #[test]
    fn headers_union_in_first_seen_order() {
        let records: Vec<Record> = [
            json!({"_id": 0, "FIPS": 1001, "Admin2": "Autauga"}),
            json!({"_id": 1, "Admin2": "Baldwin", "FIPS": 1003, "1/22/20": 4}),
        ]
        .iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
        let t = table_from_records("confirmed_ts", &records);
        assert_eq!(t.headers, vec!["FIPS", "Admin2", "1/22/20"]);
        assert_eq!(t.rows[0], vec!["1001", "Autauga", ""]);
        assert_eq!(t.rows[1], vec!["1003", "Baldwin", "4"]);
    }

    #[test]
    fn store_source_drops_id_and_rejects_empty() -> Result<()> {
        let mut store = MemoryStore::new();
        let states = test_fixtures::raw(Dataset::StateStats);
        store.replace("states_stats", &records_from_table(&states))?;

        let source = StoreSource::new(&store, CollectionNames::default());
        let loaded = source.load(Dataset::StateStats)?;
        assert!(!loaded.headers.iter().any(|h| h == ID_KEY));
        assert_eq!(loaded.len(), states.len());

        let err = source.load(Dataset::Confirmed).unwrap_err();
        assert!(err.downcast_ref::<EmptySourceError>().is_some());
        Ok(())
    }

    #[test]
    fn csv_dir_source_reads_configured_files() -> Result<()> {
        let tmp = tempdir()?;
        let files = FileNames::default();
        fs::write(tmp.path().join(&files.counties), test_fixtures::COUNTIES_CSV)?;

        let source = CsvDirSource::new(tmp.path(), files);
        let counties = source.load(Dataset::CountyStats)?;
        assert_eq!(counties.len(), test_fixtures::raw(Dataset::CountyStats).len());

        let missing = source.load(Dataset::Deaths);
        assert!(missing.is_err());
        Ok(())
    }
}
