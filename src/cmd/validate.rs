use anyhow::Context;
use ecom_datagen::validate::Validator;
use ecom_datagen::writer::read_dataset;
use std::path::PathBuf;
use std::time::Instant;

pub fn run(input: PathBuf, json: bool) -> anyhow::Result<()> {
    if !input.is_dir() {
        anyhow::bail!("input directory does not exist: {}", input.display());
    }

    if !json {
        eprintln!("Validating dataset in {}", input.display());
        eprintln!();
    }

    let start_time = Instant::now();
    let data = read_dataset(&input)
        .with_context(|| format!("Cannot read dataset from {}", input.display()))?;
    let summary = Validator::new(&data).validate();
    let elapsed = start_time.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for issue in &summary.issues {
            eprintln!("{}", issue);
        }
        if summary.truncated {
            eprintln!("(issue limit reached, further issues not shown)");
        }

        if !summary.issues.is_empty() {
            eprintln!();
        }

        eprintln!("Validation summary:");
        eprintln!("  Tables scanned: {}", summary.summary.tables_scanned);
        eprintln!("  Rows scanned: {}", summary.summary.rows_scanned);
        eprintln!("  Time: {:.3?}", elapsed);
        eprintln!();
        eprintln!("  Checks:");
        eprintln!("    - Sequential ids:  {}", summary.checks.sequential_ids);
        eprintln!("    - Unique emails:   {}", summary.checks.unique_emails);
        eprintln!("    - FK integrity:    {}", summary.checks.fk_integrity);
        eprintln!("    - Line totals:     {}", summary.checks.line_totals);
        eprintln!("    - Order totals:    {}", summary.checks.order_totals);
        eprintln!("    - Value ranges:    {}", summary.checks.value_ranges);
        eprintln!();
        eprintln!(
            "  Total: {} errors, {} warnings",
            summary.summary.errors, summary.summary.warnings
        );
        eprintln!();

        if summary.has_errors() {
            eprintln!("Result: FAILED");
        } else if summary.has_warnings() {
            eprintln!("Result: PASSED (with warnings)");
        } else {
            eprintln!("Result: PASSED");
        }
    }

    if summary.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
