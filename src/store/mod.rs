//! Persistent DuckDB store for the generated tables.
//!
//! A store is a single database file that is created on first open.
//! Each flat file is loaded by replacing its like-named table; loads
//! commit one file at a time, so tables loaded before a failing file
//! stay in place.
//!
//! # Example
//!
//! ```ignore
//! use ecom_datagen::model::Table;
//! use ecom_datagen::store::Store;
//! use std::path::Path;
//!
//! let mut store = Store::open(Path::new("ecom.duckdb")).unwrap();
//! let loaded = store.load_tables(Path::new("."), &Table::ALL, |_| {}).unwrap();
//! println!("{} tables, {} rows", loaded.len(), store.row_count("orders").unwrap());
//! ```

mod batch;
mod loader;
mod types;

pub use batch::{quote_ident, SqlValue, MAX_ROWS_PER_BATCH};
pub use loader::{CsvLoader, LoadStats, RawTable};
pub use types::{infer_column, ColumnType};

use crate::error::LoadResult;
use crate::model::Table;
use anyhow::{Context, Result};
use duckdb::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::info;

/// The destination store
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if absent) the database file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open DuckDB database: {}", path.display()))?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to create in-memory DuckDB database")?;
        Ok(Self { conn, path: None })
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace `table` with the contents of the flat file at `file`
    pub fn load_file(&mut self, file: &Path, table: &str) -> LoadResult<LoadStats> {
        CsvLoader::new(&mut self.conn).load(file, table)
    }

    /// Load each table's flat file from `dir`, in the given order.
    ///
    /// Stops at the first failing file; files before it stay loaded.
    /// `on_loaded` is called after each successful file.
    pub fn load_tables<F>(
        &mut self,
        dir: &Path,
        tables: &[Table],
        mut on_loaded: F,
    ) -> LoadResult<Vec<LoadStats>>
    where
        F: FnMut(&LoadStats),
    {
        let mut loaded = Vec::with_capacity(tables.len());
        for table in tables {
            let file = dir.join(table.file_name());
            let stats = self.load_file(&file, table.name())?;
            info!(table = %table, rows = stats.rows, "loaded table");
            on_loaded(&stats);
            loaded.push(stats);
        }
        Ok(loaded)
    }

    /// Tables in the store, sorted by name
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables WHERE table_schema = 'main' ORDER BY table_name",
        )?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    /// Number of rows in `table`
    pub fn row_count(&self, table: &str) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
                [],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to count rows in {}", table))?;
        Ok(count as u64)
    }

    /// Column names and types of `table`, in declaration order
    pub fn describe_table(&self, table: &str) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = 'main' AND table_name = ? ORDER BY ordinal_position",
        )?;
        let columns = stmt
            .query_map(params![table], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if columns.is_empty() {
            anyhow::bail!("table {} does not exist", table);
        }
        Ok(columns)
    }

    /// Get the underlying DuckDB connection (for advanced use)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
