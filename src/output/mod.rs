// src/output/mod.rs

pub mod columns;
mod rows;
mod write;

pub use write::{write_batch, write_table, write_tables};

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray, UInt64Array},
    datatypes::{DataType as ArrowDataType, Field, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::source::dates::to_epoch_days;

/// A derived-table row that knows its Arrow layout.
pub trait TableRow: Sized {
    /// Output file stem.
    const TABLE: &'static str;
    /// Arrow schema for this row type
    fn schema() -> ArrowSchema;
    /// Column arrays for `rows`, in schema order
    fn to_arrays(rows: &[Self]) -> Vec<ArrayRef>;

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        RecordBatch::try_new(Arc::new(Self::schema()), Self::to_arrays(rows))
            .with_context(|| format!("building RecordBatch for `{}`", Self::TABLE))
    }
}

// ─── field helpers ───

fn utf8(name: &str, nullable: bool) -> Field {
    Field::new(name, ArrowDataType::Utf8, nullable)
}

fn int64(name: &str, nullable: bool) -> Field {
    Field::new(name, ArrowDataType::Int64, nullable)
}

fn uint64(name: &str, nullable: bool) -> Field {
    Field::new(name, ArrowDataType::UInt64, nullable)
}

fn float64(name: &str, nullable: bool) -> Field {
    Field::new(name, ArrowDataType::Float64, nullable)
}

fn date32(name: &str) -> Field {
    Field::new(name, ArrowDataType::Date32, false)
}

// ─── column helpers ───

fn strings<'a, R: 'a>(rows: &'a [R], f: impl Fn(&'a R) -> &'a str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(rows.iter().map(f)))
}

fn opt_strings<'a, R: 'a>(rows: &'a [R], f: impl Fn(&'a R) -> Option<&'a str>) -> ArrayRef {
    Arc::new(rows.iter().map(f).collect::<StringArray>())
}

fn i64s<R>(rows: &[R], f: impl Fn(&R) -> i64) -> ArrayRef {
    Arc::new(Int64Array::from_iter_values(rows.iter().map(f)))
}

fn opt_i64s<R>(rows: &[R], f: impl Fn(&R) -> Option<i64>) -> ArrayRef {
    Arc::new(rows.iter().map(f).collect::<Int64Array>())
}

fn u64s<R>(rows: &[R], f: impl Fn(&R) -> u64) -> ArrayRef {
    Arc::new(UInt64Array::from_iter_values(rows.iter().map(f)))
}

fn opt_u64s<R>(rows: &[R], f: impl Fn(&R) -> Option<u64>) -> ArrayRef {
    Arc::new(rows.iter().map(f).collect::<UInt64Array>())
}

fn f64s<R>(rows: &[R], f: impl Fn(&R) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(rows.iter().map(f)))
}

fn opt_f64s<R>(rows: &[R], f: impl Fn(&R) -> Option<f64>) -> ArrayRef {
    Arc::new(rows.iter().map(f).collect::<Float64Array>())
}

fn dates<R>(rows: &[R], f: impl Fn(&R) -> NaiveDate) -> ArrayRef {
    Arc::new(Date32Array::from_iter_values(
        rows.iter().map(|r| to_epoch_days(f(r))),
    ))
}
