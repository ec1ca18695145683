use anyhow::{Context, Result};
use arrow::{csv::WriterBuilder, record_batch::RecordBatch};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

use super::TableRow;
use crate::config::OutputFormat;
use crate::pipeline::PipelineOutput;

/// Write one batch to `<dir>/<table>.<ext>` via a `.tmp` file and rename.
pub fn write_batch(
    dir: &Path,
    table: &str,
    batch: &RecordBatch,
    format: OutputFormat,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating output dir {}", dir.display()))?;
    let final_path = dir.join(format!("{}.{}", table, format.extension()));
    let tmp_path = dir.join(format!("{}.{}.tmp", table, format.extension()));

    let tmp_file = File::create(&tmp_path)
        .with_context(|| format!("could not create temporary file `{}`", tmp_path.display()))?;
    let buf_writer = BufWriter::new(tmp_file);

    match format {
        OutputFormat::Parquet => {
            let props = WriterProperties::builder()
                .set_compression(Compression::SNAPPY)
                .build();
            let mut writer = ArrowWriter::try_new(buf_writer, batch.schema(), Some(props))
                .context("initializing Parquet writer")?;
            writer
                .write(batch)
                .with_context(|| format!("writing `{}` to Parquet", table))?;
            writer.close().context("closing Parquet writer")?;
        }
        OutputFormat::Csv => {
            let mut writer = WriterBuilder::new().with_header(true).build(buf_writer);
            writer
                .write(batch)
                .with_context(|| format!("writing `{}` to CSV", table))?;
            writer.into_inner().flush().context("flushing CSV writer")?;
        }
    }

    fs::rename(&tmp_path, &final_path)
        .with_context(|| format!("renaming {} → {}", tmp_path.display(), final_path.display()))?;
    debug!(
        table,
        rows = batch.num_rows(),
        path = %final_path.display(),
        "table written"
    );
    Ok(final_path)
}

pub fn write_table<R: TableRow>(dir: &Path, rows: &[R], format: OutputFormat) -> Result<PathBuf> {
    let batch = R::to_batch(rows)?;
    write_batch(dir, R::TABLE, &batch, format)
}

/// Write all six tables of a run; returns the written paths.
pub fn write_tables(dir: &Path, out: &PipelineOutput, format: OutputFormat) -> Result<Vec<PathBuf>> {
    Ok(vec![
        write_table(dir, &out.county_aggregate.rows, format)?,
        write_table(dir, &out.county_time_series.rows, format)?,
        write_table(dir, &out.state_aggregate.rows, format)?,
        write_table(dir, &out.state_time_series.rows, format)?,
        write_table(dir, &out.national_time_series.rows, format)?,
        write_table(dir, std::slice::from_ref(&out.national_snapshot), format)?,
    ])
}
