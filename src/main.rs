use anyhow::{Context, Result};
use covidstats::{
    config::{PipelineConfig, SourceKind},
    output,
    pipeline::{self, PipelineOutput},
    source::{CsvDirSource, StoreSource},
    store::JsonDirStore,
};
use std::{env, path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,covidstats=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())?;
    info!(
        source = ?config.source,
        format = ?config.output_format,
        population = ?config.county_population,
        "config loaded"
    );

    // ─── 3) run against the configured source ────────────────────────
    let start = Instant::now();
    let out: PipelineOutput = match config.source {
        SourceKind::Csv => {
            info!(dir = %config.data_dir.display(), "reading CSV inputs");
            let source = CsvDirSource::new(&config.data_dir, config.files.clone());
            pipeline::run_from_source(&source, &config)?
        }
        SourceKind::Store => {
            info!(dir = %config.store_dir.display(), "reading store collections");
            let store = JsonDirStore::open(&config.store_dir)?;
            let source = StoreSource::new(&store, config.collections.clone());
            pipeline::run_from_source(&source, &config)?
        }
    };
    info!(elapsed = ?start.elapsed(), "tables built");

    // ─── 4) write outputs ────────────────────────────────────────────
    let written = output::write_tables(&config.output_dir, &out, config.output_format)
        .with_context(|| format!("writing tables to {}", config.output_dir.display()))?;
    for path in &written {
        info!(path = %path.display(), "wrote");
    }

    // ─── 5) report ───────────────────────────────────────────────────
    let snap = &out.national_snapshot;
    info!(
        date = %snap.row.date,
        population = %snap.population_display,
        confirmed = %snap.confirmed_display,
        deaths = %snap.deaths_display,
        cases_per_100k = %snap.cases_per_100k_display,
        deaths_per_100k = %snap.deaths_per_100k_display,
        death_rate = %snap.death_rate_display,
        "national snapshot"
    );
    for w in out.warnings() {
        info!(%w, "join warning");
    }

    info!("done");
    Ok(())
}
