//! Generate -> write -> load round trips against a real DuckDB file.

use chrono::NaiveDate;
use ecom_datagen::config::GenerateConfig;
use ecom_datagen::error::LoadError;
use ecom_datagen::generator::Generator;
use ecom_datagen::model::{Dataset, Table};
use ecom_datagen::store::Store;
use ecom_datagen::writer::{read_dataset, write_dataset};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn small_config(seed: u64) -> GenerateConfig {
    GenerateConfig {
        user_count: 12,
        product_count: 9,
        order_count: 30,
        min_items_per_order: 1,
        max_items_per_order: 4,
        review_count: 20,
        seed: Some(seed),
    }
}

fn generate(config: GenerateConfig) -> Dataset {
    Generator::new(config)
        .unwrap()
        .with_today(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
        .generate()
        .unwrap()
}

fn write_small(dir: &Path) -> Dataset {
    let data = generate(small_config(42));
    write_dataset(dir, &data).unwrap();
    data
}

#[test]
fn test_files_read_back_unchanged() {
    let dir = TempDir::new().unwrap();
    let data = write_small(dir.path());

    for table in Table::ALL {
        assert!(dir.path().join(table.file_name()).exists());
    }
    assert_eq!(read_dataset(dir.path()).unwrap(), data);
}

#[test]
fn test_row_counts_match_after_load() {
    let dir = TempDir::new().unwrap();
    let data = write_small(dir.path());

    let mut store = Store::open(&dir.path().join("ecom.duckdb")).unwrap();
    let loaded = store.load_tables(dir.path(), &Table::ALL, |_| {}).unwrap();
    assert_eq!(loaded.len(), 5);

    for table in Table::ALL {
        assert_eq!(
            store.row_count(table.name()).unwrap(),
            data.row_count(table) as u64,
            "row count for {}",
            table
        );
    }
    assert_eq!(
        store.list_tables().unwrap(),
        vec!["order_items", "orders", "products", "reviews", "users"]
    );
}

#[test]
fn test_reload_replaces_instead_of_appending() {
    let dir = TempDir::new().unwrap();
    let data = write_small(dir.path());
    let db = dir.path().join("ecom.duckdb");

    for _ in 0..2 {
        let mut store = Store::open(&db).unwrap();
        store.load_tables(dir.path(), &Table::ALL, |_| {}).unwrap();
    }

    let store = Store::open(&db).unwrap();
    assert_eq!(store.row_count("orders").unwrap(), data.orders.len() as u64);
    assert_eq!(
        store.row_count("order_items").unwrap(),
        data.order_items.len() as u64
    );
}

#[test]
fn test_stored_column_types() {
    let dir = TempDir::new().unwrap();
    write_small(dir.path());

    let mut store = Store::open_in_memory().unwrap();
    store.load_tables(dir.path(), &Table::ALL, |_| {}).unwrap();

    let types: Vec<String> = store
        .describe_table("orders")
        .unwrap()
        .into_iter()
        .map(|(_, t)| t)
        .collect();
    assert_eq!(types, vec!["BIGINT", "BIGINT", "DATE", "VARCHAR", "DOUBLE"]);

    let columns: Vec<String> = store
        .describe_table("products")
        .unwrap()
        .into_iter()
        .map(|(c, _)| c)
        .collect();
    assert_eq!(
        columns,
        vec!["product_id", "name", "category", "price", "in_stock"]
    );
}

#[test]
fn test_stored_order_totals_match_line_items() {
    let dir = TempDir::new().unwrap();
    write_small(dir.path());

    let mut store = Store::open_in_memory().unwrap();
    store.load_tables(dir.path(), &Table::ALL, |_| {}).unwrap();

    let mut stmt = store
        .connection()
        .prepare(
            "SELECT o.order_id, o.total_amount, COALESCE(SUM(i.line_total), 0) \
             FROM orders o LEFT JOIN order_items i ON i.order_id = o.order_id \
             GROUP BY o.order_id, o.total_amount ORDER BY o.order_id",
        )
        .unwrap();
    let rows: Vec<(i64, f64, f64)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows.len(), 30);
    for (order_id, total, sum) in rows {
        assert!(
            (total - sum).abs() < 0.005,
            "order {} total {} vs sum {}",
            order_id,
            total,
            sum
        );
    }
}

#[test]
fn test_no_dangling_foreign_keys_in_store() {
    let dir = TempDir::new().unwrap();
    write_small(dir.path());

    let mut store = Store::open_in_memory().unwrap();
    store.load_tables(dir.path(), &Table::ALL, |_| {}).unwrap();

    let dangling: i64 = store
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM order_items i \
             LEFT JOIN products p ON p.product_id = i.product_id \
             LEFT JOIN orders o ON o.order_id = i.order_id \
             WHERE p.product_id IS NULL OR o.order_id IS NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(dangling, 0);
}

#[test]
fn test_missing_file_keeps_earlier_tables() {
    let dir = TempDir::new().unwrap();
    let data = write_small(dir.path());
    fs::remove_file(dir.path().join("order_items.csv")).unwrap();

    let mut store = Store::open_in_memory().unwrap();
    let mut loaded = Vec::new();
    let err = store
        .load_tables(dir.path(), &Table::ALL, |s| loaded.push(s.table.clone()))
        .unwrap_err();

    assert!(matches!(err, LoadError::MissingInputFile { .. }));
    assert!(err.to_string().contains("order_items.csv"));
    assert_eq!(loaded, vec!["users", "products", "orders"]);
    assert_eq!(store.row_count("users").unwrap(), data.users.len() as u64);
    assert_eq!(
        store.list_tables().unwrap(),
        vec!["orders", "products", "users"]
    );
}

#[test]
fn test_malformed_row_leaves_previous_table() {
    let dir = TempDir::new().unwrap();
    let data = write_small(dir.path());

    let mut store = Store::open_in_memory().unwrap();
    store.load_tables(dir.path(), &Table::ALL, |_| {}).unwrap();

    let path = dir.path().join("orders.csv");
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("31,1,2025-01-01,pending\n");
    fs::write(&path, content).unwrap();

    let err = store.load_file(&path, "orders").unwrap_err();
    match err {
        LoadError::MalformedRow { file, line, .. } => {
            assert!(file.ends_with("orders.csv"));
            assert_eq!(line, data.orders.len() as u64 + 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.row_count("orders").unwrap(), data.orders.len() as u64);
}

#[test]
fn test_duplicate_key_rejected() {
    let dir = TempDir::new().unwrap();
    write_small(dir.path());

    let path = dir.path().join("products.csv");
    let content = fs::read_to_string(&path).unwrap();
    let first_row = content.lines().nth(1).unwrap().to_string();
    fs::write(&path, format!("{}{}\n", content, first_row)).unwrap();

    let mut store = Store::open_in_memory().unwrap();
    let err = store.load_file(&path, "products").unwrap_err();
    match err {
        LoadError::DuplicateKeyViolation { column, value, .. } => {
            assert_eq!(column, "product_id");
            assert_eq!(value, "1");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.list_tables().unwrap().is_empty());
}

#[test]
fn test_zero_item_orders_total_zero() {
    let dir = TempDir::new().unwrap();
    let config = GenerateConfig {
        min_items_per_order: 0,
        max_items_per_order: 1,
        ..small_config(3)
    };
    let data = generate(config);
    write_dataset(dir.path(), &data).unwrap();

    let empty = data
        .orders
        .iter()
        .filter(|o| !data.order_items.iter().any(|i| i.order_id == o.order_id))
        .count();
    assert!(empty > 0, "seed 3 should yield at least one empty order");

    let mut store = Store::open_in_memory().unwrap();
    store.load_tables(dir.path(), &Table::ALL, |_| {}).unwrap();

    let zero_totals: i64 = store
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM orders o WHERE NOT EXISTS \
             (SELECT 1 FROM order_items i WHERE i.order_id = o.order_id) \
             AND o.total_amount = 0",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(zero_totals as usize, empty);
}

#[test]
fn test_empty_tables_load() {
    let dir = TempDir::new().unwrap();
    let config = GenerateConfig {
        order_count: 0,
        review_count: 0,
        ..small_config(1)
    };
    write_dataset(dir.path(), &generate(config)).unwrap();

    let mut store = Store::open_in_memory().unwrap();
    store.load_tables(dir.path(), &Table::ALL, |_| {}).unwrap();
    assert_eq!(store.row_count("orders").unwrap(), 0);
    assert_eq!(store.row_count("reviews").unwrap(), 0);
    assert_eq!(store.row_count("users").unwrap(), 12);
}

#[test]
fn test_subset_load() {
    let dir = TempDir::new().unwrap();
    write_small(dir.path());

    let mut store = Store::open_in_memory().unwrap();
    store
        .load_tables(dir.path(), &[Table::Users, Table::Reviews], |_| {})
        .unwrap();
    assert_eq!(store.list_tables().unwrap(), vec!["reviews", "users"]);
}

#[test]
fn test_default_sizes_round_trip() {
    let dir = TempDir::new().unwrap();
    let data = generate(GenerateConfig {
        seed: Some(2024),
        ..Default::default()
    });
    write_dataset(dir.path(), &data).unwrap();

    let mut store = Store::open(&dir.path().join("ecom.duckdb")).unwrap();
    store.load_tables(dir.path(), &Table::ALL, |_| {}).unwrap();

    assert_eq!(store.row_count("users").unwrap(), 50);
    assert_eq!(store.row_count("products").unwrap(), 50);
    assert_eq!(store.row_count("orders").unwrap(), 200);
    assert_eq!(store.row_count("reviews").unwrap(), 150);
    let items = store.row_count("order_items").unwrap();
    assert_eq!(items, data.order_items.len() as u64);
    assert!((200..=1000).contains(&items));
}
