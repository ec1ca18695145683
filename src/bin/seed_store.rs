//! Load the four input CSVs into the JSON-lines document store, replacing
//! each collection wholesale.

use anyhow::Result;
use covidstats::{
    config::PipelineConfig,
    source::{records_from_table, CsvDirSource, Dataset, TableSource},
    store::{DocumentStore, JsonDirStore},
};
use std::{env, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,covidstats=info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())?;

    let source = CsvDirSource::new(&config.data_dir, config.files.clone());
    let mut store = JsonDirStore::open(&config.store_dir)?;

    for dataset in Dataset::ALL {
        let table = source.load(dataset)?;
        let records = records_from_table(&table);
        let collection = config.collections.get(dataset);
        store.replace(collection, &records)?;
        info!(collection, records = records.len(), "collection replaced");
    }

    info!(collections = ?store.collections()?, "store seeded");
    Ok(())
}
