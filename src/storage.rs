//! SQLite-backed tabular store.

use std::str::FromStr;

use agent_core::TabularStore;
use async_trait::async_trait;
use serde_json::{Number, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use supplychain_core_types::{CollaboratorError, Row};
use tracing::debug;

/// Accepts `sqlite:///relative.db` URIs as written for SQLAlchemy alongside
/// the native `sqlite://relative.db` form.
pub fn normalize_db_uri(uri: &str) -> String {
    let uri = uri.trim();
    match uri.strip_prefix("sqlite:///") {
        Some(rest) => format!("sqlite://{rest}"),
        None => uri.to_string(),
    }
}

pub async fn connect(uri: &str, create_if_missing: bool) -> Result<SqlitePool, sqlx::Error> {
    let options =
        SqliteConnectOptions::from_str(&normalize_db_uri(uri))?.create_if_missing(create_if_missing);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn open(uri: &str) -> Result<Self, CollaboratorError> {
        let pool = connect(uri, false)
            .await
            .map_err(|err| CollaboratorError::storage(err.to_string()))?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TabularStore for SqliteStore {
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, CollaboratorError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| CollaboratorError::storage(err.to_string()))?;
        debug!(rows = rows.len(), "query returned");
        rows.iter().map(row_to_json).collect()
    }
}

fn row_to_json(row: &SqliteRow) -> Result<Row, CollaboratorError> {
    let mut out = Row::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row
            .try_get_raw(index)
            .map_err(|err| CollaboratorError::storage(err.to_string()))?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_name = raw.type_info().name().to_ascii_uppercase();
            decode_cell(row, index, &type_name)?
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn decode_cell(row: &SqliteRow, index: usize, type_name: &str) -> Result<Value, CollaboratorError> {
    let mismatch = |err: sqlx::Error| CollaboratorError::storage(err.to_string());
    Ok(match type_name {
        "INTEGER" | "INT" | "BIGINT" | "INT8" | "BOOLEAN" => {
            Value::from(row.try_get::<i64, _>(index).map_err(mismatch)?)
        }
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => {
            let value = row.try_get::<f64, _>(index).map_err(mismatch)?;
            Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
        }
        "BLOB" => {
            let bytes = row.try_get::<Vec<u8>, _>(index).map_err(mismatch)?;
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::String(row.try_get::<String, _>(index).map_err(mismatch)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlalchemy_style_uris_are_normalized() {
        assert_eq!(normalize_db_uri("sqlite:///inventory.db"), "sqlite://inventory.db");
        assert_eq!(normalize_db_uri("sqlite:////tmp/x.db"), "sqlite:///tmp/x.db");
        assert_eq!(normalize_db_uri("sqlite://data/x.db"), "sqlite://data/x.db");
        assert_eq!(normalize_db_uri(" sqlite::memory: "), "sqlite::memory:");
    }

    #[tokio::test]
    async fn rows_come_back_as_typed_json() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE inventory (\"Order Region\" TEXT, Sales REAL, \"Order Id\" INTEGER)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO inventory VALUES ('Southwest', 10.5, 1), ('Oceania', 4.5, 2), (NULL, 1.0, 3)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let store = SqliteStore::new(pool);
        let rows = store
            .execute("SELECT SUM(Sales) AS total_sales, COUNT(*) AS orders FROM inventory")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["total_sales"], Value::from(16.0));
        assert_eq!(rows[0]["orders"], Value::from(3));

        let rows = store
            .execute("SELECT `Order Region` FROM inventory ORDER BY `Order Id`")
            .await
            .unwrap();
        assert_eq!(rows[0]["Order Region"], Value::from("Southwest"));
        assert_eq!(rows[2]["Order Region"], Value::Null);
    }

    #[tokio::test]
    async fn columns_keep_select_order() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let rows = SqliteStore::new(pool)
            .execute(
                "SELECT 1 AS `Customer Id`, 'Mary' AS `Customer Fname`, \
                 9.5 AS total_sales, 'A' AS `Customer Lname`",
            )
            .await
            .unwrap();
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["Customer Id", "Customer Fname", "total_sales", "Customer Lname"]
        );
        let json = serde_json::to_string(&rows[0]).unwrap();
        assert!(json.starts_with(r#"{"Customer Id":1,"Customer Fname":"Mary""#));
    }

    #[tokio::test]
    async fn sql_errors_are_storage_failures() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let err = SqliteStore::new(pool)
            .execute("SELECT * FROM missing_table")
            .await
            .unwrap_err();
        assert_eq!(err.collaborator, supplychain_core_types::Collaborator::Storage);
        assert!(err.message.contains("missing_table"));
    }
}
