//! Generate command CLI handler.

use chrono::NaiveDate;
use ecom_datagen::config::{ConfigFile, GenerateConfig};
use ecom_datagen::generator::Generator;
use ecom_datagen::model::Table;
use ecom_datagen::writer::{table_path, write_dataset};
use std::path::PathBuf;
use std::time::Instant;

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub user_count: Option<usize>,
    pub product_count: Option<usize>,
    pub order_count: Option<usize>,
    pub min_items_per_order: Option<usize>,
    pub max_items_per_order: Option<usize>,
    pub review_count: Option<usize>,
}

impl Overrides {
    fn apply(self, mut config: GenerateConfig) -> GenerateConfig {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(n) = self.user_count {
            config.user_count = n;
        }
        if let Some(n) = self.product_count {
            config.product_count = n;
        }
        if let Some(n) = self.order_count {
            config.order_count = n;
        }
        if let Some(n) = self.min_items_per_order {
            config.min_items_per_order = n;
        }
        if let Some(n) = self.max_items_per_order {
            config.max_items_per_order = n;
        }
        if let Some(n) = self.review_count {
            config.review_count = n;
        }
        config
    }
}

pub fn run(
    output: PathBuf,
    config: Option<PathBuf>,
    overrides: Overrides,
    today: Option<NaiveDate>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let file = ConfigFile::load_or_default(config.as_deref())?;
    let config = overrides.apply(file.generate);

    let mut generator = Generator::new(config)?;
    if let Some(today) = today {
        generator = generator.with_today(today);
    }

    eprintln!(
        "Generating dataset (seed: {}, today: {})",
        generator.seed(),
        generator.today()
    );

    let start_time = Instant::now();
    let data = generator.generate()?;

    if dry_run {
        eprintln!();
        eprintln!("Dry run - no files written. Would write:");
        for table in Table::ALL {
            eprintln!(
                "  {:<16} {:>8} rows",
                table_path(&output, table).display(),
                data.row_count(table)
            );
        }
        return Ok(());
    }

    let written = write_dataset(&output, &data)?;
    for file in &written {
        eprintln!("Wrote {} rows to {}", file.rows, file.path.display());
    }

    eprintln!();
    eprintln!("Generation summary:");
    eprintln!("  Output directory: {}", output.display());
    eprintln!("  Files written: {}", written.len());
    eprintln!("  Total rows: {}", data.total_rows());
    eprintln!("  Seed: {}", generator.seed());
    eprintln!("  Time: {:.3?}", start_time.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let base = GenerateConfig {
            user_count: 10,
            review_count: 3,
            ..Default::default()
        };
        let overrides = Overrides {
            user_count: Some(99),
            seed: Some(5),
            ..Default::default()
        };

        let merged = overrides.apply(base);
        assert_eq!(merged.user_count, 99);
        assert_eq!(merged.review_count, 3);
        assert_eq!(merged.seed, Some(5));
    }
}
