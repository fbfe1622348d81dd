//! Ingest command CLI handler.

use ecom_datagen::config::ConfigFile;
use ecom_datagen::error::LoadError;
use ecom_datagen::model::Table;
use ecom_datagen::store::Store;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

pub fn run(
    input: PathBuf,
    database: Option<PathBuf>,
    config: Option<PathBuf>,
    tables: Option<String>,
    progress: bool,
) -> anyhow::Result<()> {
    if !input.is_dir() {
        anyhow::bail!("input directory does not exist: {}", input.display());
    }

    let mut ingest = ConfigFile::load_or_default(config.as_deref())?.ingest;
    if let Some(database) = database {
        ingest.database = database;
    }
    if let Some(list) = tables {
        ingest.tables = Some(parse_tables(&list)?);
    }
    let selected = ingest.selected_tables();
    if selected.is_empty() {
        anyhow::bail!("no tables selected");
    }

    eprintln!(
        "Loading {} tables from {} into {}",
        selected.len(),
        input.display(),
        ingest.database.display()
    );

    let mut store = Store::open(&ingest.database)?;
    let start_time = Instant::now();

    let pb = if progress {
        let pb = ProgressBar::new(selected.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tables {msg}",
            )
            .unwrap()
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut done: Vec<String> = Vec::new();
    let result = store.load_tables(&input, &selected, |stats| {
        let line = format!("Loaded {} rows into {}", stats.rows, stats.table);
        match &pb {
            Some(pb) => {
                pb.println(&line);
                pb.inc(1);
            }
            None => eprintln!("{}", line),
        }
        done.push(stats.table.clone());
    });

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    let loaded = result.map_err(|err| {
        let message = stop_message(&err, &done);
        anyhow::Error::new(err).context(message)
    })?;

    for stats in &loaded {
        let stored = store.row_count(&stats.table)?;
        if stored != stats.rows {
            anyhow::bail!(
                "table {} holds {} rows after loading {} rows from {}",
                stats.table,
                stored,
                stats.rows,
                stats.file.display()
            );
        }
    }

    let total_rows: u64 = loaded.iter().map(|s| s.rows).sum();
    eprintln!();
    eprintln!("Ingest summary:");
    eprintln!("  Database: {}", ingest.database.display());
    eprintln!("  Tables loaded: {}", loaded.len());
    eprintln!("  Total rows: {}", total_rows);
    eprintln!("  Time: {:.3?}", start_time.elapsed());

    Ok(())
}

/// Context for a load that stopped partway, naming the failing file
fn stop_message(err: &LoadError, done: &[String]) -> String {
    let file = err.file().display();
    if done.is_empty() {
        format!("ingest stopped at {file} before any table was loaded")
    } else {
        format!(
            "ingest stopped at {file}; already loaded tables are kept: {}",
            done.join(", ")
        )
    }
}

/// Parse a comma-separated table list
fn parse_tables(list: &str) -> anyhow::Result<Vec<Table>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Table>().map_err(|e| anyhow::anyhow!(e)))
        .collect()
}
