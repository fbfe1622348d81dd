mod generate;
mod ingest;
mod validate;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecom-datagen")]
#[command(version)]
#[command(about = "Generate synthetic e-commerce CSV data and bulk-load it into DuckDB", long_about = None)]
pub struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate users, products, orders, order items and reviews as CSV files
    Generate {
        /// Output directory for the CSV files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// YAML config file (generate: section)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Number of users
        #[arg(long)]
        user_count: Option<usize>,

        /// Number of products
        #[arg(long)]
        product_count: Option<usize>,

        /// Number of orders
        #[arg(long)]
        order_count: Option<usize>,

        /// Minimum line items per order (0 allows empty orders)
        #[arg(long)]
        min_items_per_order: Option<usize>,

        /// Maximum line items per order
        #[arg(long)]
        max_items_per_order: Option<usize>,

        /// Number of reviews
        #[arg(long)]
        review_count: Option<usize>,

        /// Anchor date for the trailing date windows (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Generate and report counts without writing files (dry run)
        #[arg(long)]
        dry_run: bool,
    },

    /// Load the CSV files into a DuckDB database, replacing existing tables
    Ingest {
        /// Directory containing the CSV files
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// DuckDB database file (default: ecom.duckdb)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// YAML config file (ingest: section)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only load specific tables (comma-separated)
        #[arg(short, long)]
        tables: Option<String>,

        /// Show progress during loading
        #[arg(short, long)]
        progress: bool,
    },

    /// Check the CSV files for id, key, total and range consistency
    Validate {
        /// Directory containing the CSV files
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            output,
            config,
            seed,
            user_count,
            product_count,
            order_count,
            min_items_per_order,
            max_items_per_order,
            review_count,
            today,
            dry_run,
        } => generate::run(
            output,
            config,
            generate::Overrides {
                seed,
                user_count,
                product_count,
                order_count,
                min_items_per_order,
                max_items_per_order,
                review_count,
            },
            today,
            dry_run,
        ),
        Commands::Ingest {
            input,
            database,
            config,
            tables,
            progress,
        } => ingest::run(input, database, config, tables, progress),
        Commands::Validate { input, json } => validate::run(input, json),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "ecom-datagen",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
