//! Loads the supply-chain CSV export into the `inventory` table.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Sqlite};
use thiserror::Error;
use tracing::{debug, info};

pub const INVENTORY_TABLE: &str = "inventory";

/// SQLite caps bound parameters per statement at 32766.
const MAX_BIND_PARAMS: usize = 32_000;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv has no header row")]
    MissingHeader,
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    fn sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

#[derive(Debug)]
pub struct LoadSummary {
    pub table: String,
    pub rows: usize,
    pub columns: Vec<(String, ColumnType)>,
}

/// ISO-8859-1 maps each byte to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

struct Table {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

fn parse_csv(text: &str) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    if headers.iter().all(|header| header.is_empty()) {
        return Err(LoadError::MissingHeader);
    }
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut values: Vec<String> = record.iter().map(|value| value.to_string()).collect();
        values.resize(headers.len(), String::new());
        records.push(values);
    }
    Ok(Table { headers, records })
}

/// Integer if every non-empty value is one, then real, else text.
pub fn infer_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut inferred = ColumnType::Integer;
    let mut seen = false;
    for value in values.map(str::trim).filter(|value| !value.is_empty()) {
        seen = true;
        if inferred == ColumnType::Integer && value.parse::<i64>().is_err() {
            inferred = ColumnType::Real;
        }
        if inferred == ColumnType::Real && value.parse::<f64>().is_err() {
            return ColumnType::Text;
        }
    }
    if seen {
        inferred
    } else {
        ColumnType::Text
    }
}

/// Rewrites `1/31/2018 22:56` style timestamps to ISO form so SQLite date
/// functions can read them.
pub fn normalize_timestamp(value: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(value.trim(), "%m/%d/%Y %H:%M")
        .ok()
        .map(|parsed| parsed.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub async fn load_csv(pool: &SqlitePool, path: &Path, table: &str) -> Result<LoadSummary, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let parsed = parse_csv(&decode_latin1(&bytes))?;
    load_table(pool, table, parsed).await
}

async fn load_table(pool: &SqlitePool, table: &str, parsed: Table) -> Result<LoadSummary, LoadError> {
    let Table { headers, records } = parsed;
    let types: Vec<ColumnType> = (0..headers.len())
        .map(|column| infer_column_type(records.iter().map(|record| record[column].as_str())))
        .collect();
    debug!(columns = headers.len(), rows = records.len(), "inferred csv schema");

    let column_list = headers
        .iter()
        .map(|header| quote_ident(header))
        .collect::<Vec<_>>()
        .join(", ");
    let create = format!(
        "CREATE TABLE {} ({})",
        quote_ident(table),
        headers
            .iter()
            .zip(&types)
            .map(|(header, ty)| format!("{} {}", quote_ident(header), ty.sql()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut tx = pool.begin().await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&create).execute(&mut *tx).await?;

    let batch = (MAX_BIND_PARAMS / headers.len().max(1)).max(1);
    for chunk in records.chunks(batch) {
        let mut insert: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "INSERT INTO {} ({column_list}) ",
            quote_ident(table)
        ));
        insert.push_values(chunk, |mut row, record| {
            for (value, ty) in record.iter().zip(&types) {
                let value = value.trim();
                match (ty, value.is_empty()) {
                    (ColumnType::Integer, false) => {
                        row.push_bind(value.parse::<i64>().ok());
                    }
                    (ColumnType::Real, false) => {
                        row.push_bind(value.parse::<f64>().ok());
                    }
                    (ColumnType::Text, false) => {
                        let text = normalize_timestamp(value).unwrap_or_else(|| value.to_string());
                        row.push_bind(Some(text));
                    }
                    (_, true) => {
                        row.push_bind(Option::<String>::None);
                    }
                }
            }
        });
        insert.build().execute(&mut *tx).await?;
    }
    tx.commit().await?;

    info!(table, rows = records.len(), columns = headers.len(), "dataset loaded");
    Ok(LoadSummary {
        table: table.to_string(),
        rows: records.len(),
        columns: headers.into_iter().zip(types).collect(),
    })
}
