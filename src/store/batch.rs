//! SQL generation for bulk table replacement.
//!
//! Rows are written as multi-row `INSERT ... VALUES` statements of at
//! most [`MAX_ROWS_PER_BATCH`] rows each.

use super::types::ColumnType;

/// Maximum rows per generated INSERT statement
pub const MAX_ROWS_PER_BATCH: usize = 1_000;

/// A typed cell ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    /// ISO calendar date, cast by the DATE column on insert
    Date(String),
    Text(String),
}

impl SqlValue {
    /// Convert a raw cell according to its column's inferred type
    pub fn from_cell(cell: &str, column_type: ColumnType) -> SqlValue {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return SqlValue::Null;
        }
        match column_type {
            ColumnType::BigInt => trimmed
                .parse()
                .map(SqlValue::Int)
                .unwrap_or_else(|_| SqlValue::Text(cell.to_string())),
            ColumnType::Double => trimmed
                .parse()
                .map(SqlValue::Float)
                .unwrap_or_else(|_| SqlValue::Text(cell.to_string())),
            ColumnType::Date => SqlValue::Date(trimmed.to_string()),
            ColumnType::Varchar => SqlValue::Text(cell.to_string()),
        }
    }

    /// Format as a SQL literal
    pub fn to_sql(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) => format!("{:?}", f),
            SqlValue::Date(d) => format!("DATE '{}'", escape_string(d)),
            SqlValue::Text(s) => format!("'{}'", escape_string(s)),
        }
    }
}

/// Escape single quotes by doubling them (SQL standard)
fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Quote an identifier, doubling embedded double quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Generate the DROP + CREATE pair that replaces a table.
///
/// With `primary_key` set, the first column is declared as the key.
pub fn replace_table_sql(
    table: &str,
    columns: &[String],
    types: &[ColumnType],
    primary_key: bool,
) -> String {
    let table = quote_ident(table);
    let mut sql = format!("DROP TABLE IF EXISTS {};\nCREATE TABLE {} (", table, table);
    for (i, (column, column_type)) in columns.iter().zip(types).enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(&quote_ident(column));
        sql.push(' ');
        sql.push_str(&column_type.to_string());
        if i == 0 && primary_key {
            sql.push_str(" PRIMARY KEY");
        }
    }
    sql.push_str(");");
    sql
}

/// Generate a batched INSERT statement from typed values
pub fn generate_batch_insert(table: &str, columns: &[String], rows: &[Vec<SqlValue>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut sql = format!("INSERT INTO {} (", quote_ident(table));
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(&quote_ident(col));
    }
    sql.push_str(") VALUES\n");

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            sql.push_str(",\n");
        }
        sql.push('(');
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&value.to_sql());
        }
        sql.push(')');
    }
    sql.push(';');

    sql
}

/// Split rows into INSERT statements of at most `batch_size` rows
pub fn batch_inserts(
    table: &str,
    columns: &[String],
    rows: &[Vec<SqlValue>],
    batch_size: usize,
) -> Vec<String> {
    rows.chunks(batch_size.max(1))
        .map(|chunk| generate_batch_insert(table, columns, chunk))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_value_from_cell() {
        assert_eq!(SqlValue::from_cell("42", ColumnType::BigInt), SqlValue::Int(42));
        assert_eq!(
            SqlValue::from_cell("12.5", ColumnType::Double),
            SqlValue::Float(12.5)
        );
        assert_eq!(
            SqlValue::from_cell("2024-03-15", ColumnType::Date),
            SqlValue::Date("2024-03-15".to_string())
        );
        assert_eq!(SqlValue::from_cell("", ColumnType::BigInt), SqlValue::Null);
        assert_eq!(
            SqlValue::from_cell("Hello", ColumnType::Varchar),
            SqlValue::Text("Hello".to_string())
        );
    }

    #[test]
    fn test_value_to_sql() {
        assert_eq!(SqlValue::Null.to_sql(), "NULL");
        assert_eq!(SqlValue::Int(-3).to_sql(), "-3");
        assert_eq!(SqlValue::Float(0.0).to_sql(), "0.0");
        assert_eq!(SqlValue::Float(19.99).to_sql(), "19.99");
        assert_eq!(
            SqlValue::Date("2024-03-15".to_string()).to_sql(),
            "DATE '2024-03-15'"
        );
        assert_eq!(
            SqlValue::Text("O'Brien".to_string()).to_sql(),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_replace_table_sql() {
        let sql = replace_table_sql(
            "users",
            &cols(&["user_id", "email"]),
            &[ColumnType::BigInt, ColumnType::Varchar],
            true,
        );
        assert_eq!(
            sql,
            "DROP TABLE IF EXISTS \"users\";\nCREATE TABLE \"users\" (\"user_id\" BIGINT PRIMARY KEY, \"email\" VARCHAR);"
        );
    }

    #[test]
    fn test_generate_batch_insert() {
        let rows = vec![
            vec![SqlValue::Int(1), SqlValue::Text("alice".to_string())],
            vec![SqlValue::Int(2), SqlValue::Null],
        ];
        let sql = generate_batch_insert("users", &cols(&["user_id", "name"]), &rows);
        assert_eq!(
            sql,
            "INSERT INTO \"users\" (\"user_id\", \"name\") VALUES\n(1, 'alice'),\n(2, NULL);"
        );
    }

    #[test]
    fn test_generate_batch_insert_empty() {
        assert!(generate_batch_insert("t", &cols(&["a"]), &[]).is_empty());
    }

    #[test]
    fn test_batch_inserts_chunking() {
        let rows: Vec<Vec<SqlValue>> = (0..5).map(|i| vec![SqlValue::Int(i)]).collect();
        let statements = batch_inserts("t", &cols(&["a"]), &rows, 2);
        assert_eq!(statements.len(), 3);
        assert!(statements[2].ends_with("(4);"));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("orders"), "\"orders\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
