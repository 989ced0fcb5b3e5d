use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{Row, TypeInfo, ValueRef};
use tax_core::RepositoryError;

/// Get a decimal value from a row.
///
/// Rule tables store amounts as decimal TEXT so they round-trip exactly;
/// INTEGER and REAL values written by hand-edited seeds are accepted too.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            Decimal::from_str(val.trim()).map_err(|e| {
                RepositoryError::Database(format!(
                    "Invalid decimal '{}' in column '{}': {}",
                    val, column, e
                ))
            })
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Get an optional decimal value from a row, returning None for NULL values.
pub fn get_optional_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Convert a Decimal to the TEXT form stored in rule tables.
pub fn decimal_to_text(d: Decimal) -> String {
    d.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_decimals (
                id INTEGER PRIMARY KEY,
                text_value TEXT,
                int_value INTEGER,
                real_value REAL,
                blob_value BLOB
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch_after_insert(insert: &str) -> SqliteRow {
        let pool = setup_test_db().await;
        sqlx::query(insert)
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        sqlx::query("SELECT * FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row")
    }

    // get_decimal tests

    #[tokio::test]
    async fn test_get_decimal_from_text() {
        let row =
            fetch_after_insert("INSERT INTO test_decimals (id, text_value) VALUES (1, '83.25')")
                .await;

        assert_eq!(get_decimal(&row, "text_value"), Ok(dec!(83.25)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_text_keeps_precision() {
        let row = fetch_after_insert(
            "INSERT INTO test_decimals (id, text_value) VALUES (1, '1234567890.123456789')",
        )
        .await;

        assert_eq!(get_decimal(&row, "text_value"), Ok(dec!(1234567890.123456789)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_invalid_text() {
        let row =
            fetch_after_insert("INSERT INTO test_decimals (id, text_value) VALUES (1, 'lakh')")
                .await;

        let result = get_decimal(&row, "text_value");

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.starts_with("Invalid decimal 'lakh'")));
    }

    #[tokio::test]
    async fn test_get_decimal_from_integer() {
        let row =
            fetch_after_insert("INSERT INTO test_decimals (id, int_value) VALUES (1, 250001)")
                .await;

        assert_eq!(get_decimal(&row, "int_value"), Ok(dec!(250001)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_real() {
        let row =
            fetch_after_insert("INSERT INTO test_decimals (id, real_value) VALUES (1, 0.12)")
                .await;

        assert_eq!(get_decimal(&row, "real_value"), Ok(dec!(0.12)));
    }

    #[tokio::test]
    async fn test_get_decimal_column_not_found() {
        let row = fetch_after_insert("INSERT INTO test_decimals (id) VALUES (1)").await;

        let result = get_decimal(&row, "nonexistent_column");

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.starts_with("Column 'nonexistent_column' not found:")));
    }

    #[tokio::test]
    async fn test_get_decimal_unexpected_type() {
        let row =
            fetch_after_insert("INSERT INTO test_decimals (id, blob_value) VALUES (1, x'00ff')")
                .await;

        assert_eq!(
            get_decimal(&row, "blob_value"),
            Err(RepositoryError::Database(
                "Unexpected type 'BLOB' for column 'blob_value'".to_string()
            ))
        );
    }

    // get_optional_decimal tests

    #[tokio::test]
    async fn test_get_optional_decimal_from_text() {
        let row =
            fetch_after_insert("INSERT INTO test_decimals (id, text_value) VALUES (1, '2400000')")
                .await;

        assert_eq!(get_optional_decimal(&row, "text_value"), Ok(Some(dec!(2400000))));
    }

    #[tokio::test]
    async fn test_get_optional_decimal_from_null_returns_none() {
        let row = fetch_after_insert("INSERT INTO test_decimals (id) VALUES (1)").await;

        assert_eq!(get_optional_decimal(&row, "text_value"), Ok(None));
    }

    // decimal_to_text tests

    #[test]
    fn test_decimal_to_text_drops_trailing_zeros() {
        assert_eq!(decimal_to_text(dec!(83.00)), "83");
        assert_eq!(decimal_to_text(dec!(0.50)), "0.5");
    }

    #[test]
    fn test_decimal_to_text_whole_amount() {
        assert_eq!(decimal_to_text(dec!(1200000)), "1200000");
    }
}
