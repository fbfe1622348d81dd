//! Flat-file serialization of generated tables.
//!
//! One comma-separated file per entity, header row first, fields in
//! struct declaration order. Dates serialize as ISO calendar dates and
//! money fields are already rounded to cents, so their shortest textual
//! form has at most two decimals.

use crate::model::{Dataset, Entity, Order, OrderItem, Product, Review, Table, User};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const WRITER_BUFFER_SIZE: usize = 256 * 1024;

/// A flat file produced by [`write_dataset`]
#[derive(Debug, Clone)]
pub struct WrittenFile {
    pub table: Table,
    pub path: PathBuf,
    pub rows: usize,
}

/// Path of a table's flat file inside `dir`
pub fn table_path(dir: &Path, table: Table) -> PathBuf {
    dir.join(table.file_name())
}

/// Write one entity collection, header row included even when empty
pub fn write_table<T: Entity>(path: &Path, rows: &[T]) -> Result<usize> {
    let file = File::create(path)
        .with_context(|| format!("Cannot create output file: {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::with_capacity(WRITER_BUFFER_SIZE, file));

    writer.write_record(T::COLUMNS)?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row {} to {}", row.id(), path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    debug!(table = T::TABLE, rows = rows.len(), path = %path.display(), "wrote table");
    Ok(rows.len())
}

/// Write all five tables into `dir`, creating it if needed
pub fn write_dataset(dir: &Path, data: &Dataset) -> Result<Vec<WrittenFile>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(Table::ALL.len());
    for table in Table::ALL {
        let path = table_path(dir, table);
        let rows = match table {
            Table::Users => write_table(&path, &data.users)?,
            Table::Products => write_table(&path, &data.products)?,
            Table::Orders => write_table(&path, &data.orders)?,
            Table::OrderItems => write_table(&path, &data.order_items)?,
            Table::Reviews => write_table(&path, &data.reviews)?,
        };
        written.push(WrittenFile { table, path, rows });
    }
    Ok(written)
}

/// Read one entity collection back, checking the header layout
pub fn read_table<T: Entity>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Cannot open input file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Cannot read header row of {}", path.display()))?;
    if !headers.iter().eq(T::COLUMNS.iter().copied()) {
        anyhow::bail!(
            "unexpected header in {}: expected {}, found {}",
            path.display(),
            T::COLUMNS.join(","),
            headers.iter().collect::<Vec<_>>().join(",")
        );
    }

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        // Line 1 is the header
        let row: T =
            record.with_context(|| format!("Bad row at line {} of {}", i + 2, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read all five tables from `dir`
pub fn read_dataset(dir: &Path) -> Result<Dataset> {
    Ok(Dataset {
        users: read_table::<User>(&table_path(dir, Table::Users))?,
        products: read_table::<Product>(&table_path(dir, Table::Products))?,
        orders: read_table::<Order>(&table_path(dir, Table::Orders))?,
        order_items: read_table::<OrderItem>(&table_path(dir, Table::OrderItems))?,
        reviews: read_table::<Review>(&table_path(dir, Table::Reviews))?,
    })
}
