use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use supplychain_assistant::loader::{load_csv, INVENTORY_TABLE};
use supplychain_assistant::storage::connect;
use supplychain_assistant::AppConfig;

#[derive(Args, Clone, Debug)]
pub struct LoadDataArgs {
    /// CSV export to load (defaults to storage.csv_path)
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Target database URI (defaults to storage.db_uri)
    #[arg(long, value_name = "URI")]
    pub db: Option<String>,

    /// Destination table
    #[arg(long, default_value = INVENTORY_TABLE)]
    pub table: String,
}

pub async fn cmd_load_data(args: LoadDataArgs, config: &AppConfig) -> Result<()> {
    let csv_path = args.csv.unwrap_or_else(|| config.storage.csv_path.clone());
    let db_uri = args.db.unwrap_or_else(|| config.storage.db_uri.clone());

    let pool = connect(&db_uri, true)
        .await
        .with_context(|| format!("Failed to open database {db_uri}"))?;
    let summary = load_csv(&pool, &csv_path, &args.table)
        .await
        .with_context(|| format!("Failed to load {}", csv_path.display()))?;
    pool.close().await;

    println!(
        "Loaded {} rows into `{}` ({} columns) from {}",
        summary.rows,
        summary.table,
        summary.columns.len(),
        csv_path.display()
    );
    for (name, ty) in &summary.columns {
        println!("  {name:<40} {ty}");
    }
    Ok(())
}
