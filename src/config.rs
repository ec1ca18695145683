// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::source::Dataset;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "COVIDSTATS_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Csv,
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Where a county's population comes from in both county tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationSource {
    /// County reference table, falling back to the deaths series.
    #[default]
    ReferenceThenSeries,
    /// County reference table only.
    Reference,
    /// The `Population` column of the deaths series only.
    Series,
}

impl PopulationSource {
    pub fn resolve(&self, reference: Option<u64>, series: Option<u64>) -> Option<u64> {
        match self {
            PopulationSource::ReferenceThenSeries => reference.or(series),
            PopulationSource::Reference => reference,
            PopulationSource::Series => series,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub confirmed: String,
    pub deaths: String,
    pub states: String,
    pub counties: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            confirmed: "time_series_covid19_confirmed_US.csv".into(),
            deaths: "time_series_covid19_deaths_US.csv".into(),
            states: "states_stats.csv".into(),
            counties: "counties_stats.csv".into(),
        }
    }
}

impl FileNames {
    pub fn get(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Confirmed => &self.confirmed,
            Dataset::Deaths => &self.deaths,
            Dataset::StateStats => &self.states,
            Dataset::CountyStats => &self.counties,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectionNames {
    pub confirmed: String,
    pub deaths: String,
    pub states: String,
    pub counties: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            confirmed: "confirmed_ts".into(),
            deaths: "deaths_ts".into(),
            states: "states_stats".into(),
            counties: "counties_stats".into(),
        }
    }
}

impl CollectionNames {
    pub fn get(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Confirmed => &self.confirmed,
            Dataset::Deaths => &self.deaths,
            Dataset::StateStats => &self.states,
            Dataset::CountyStats => &self.counties,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceKind,
    /// Directory holding the input CSV files.
    pub data_dir: PathBuf,
    /// Root of the JSON-lines document store.
    pub store_dir: PathBuf,
    pub files: FileNames,
    pub collections: CollectionNames,
    pub output_dir: PathBuf,
    pub output_format: OutputFormat,
    pub county_population: PopulationSource,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            data_dir: PathBuf::from("data"),
            store_dir: PathBuf::from("store"),
            files: FileNames::default(),
            collections: CollectionNames::default(),
            output_dir: PathBuf::from("out"),
            output_format: OutputFormat::default(),
            county_population: PopulationSource::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context("parsing pipeline config YAML")
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Config from an explicit path, else `$COVIDSTATS_CONFIG`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let from_env = env::var_os(CONFIG_ENV).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(p) => {
                info!(config = %p.display(), "loading config");
                Self::from_yaml_file(p)
            }
            None => {
                info!("no config file; using defaults");
                Ok(Self::default())
            }
        }
    }
}
