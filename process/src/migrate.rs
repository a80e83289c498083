use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sqlx::PgPool;

/// Applies pending `.sql` files in name order, recording each one in the
/// `migrations` table so reruns skip it. The whole run is one transaction:
/// a failing migration rolls back everything applied before it.
pub async fn apply_migrations(pool: &PgPool, dir: &Path) -> Result<()> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("reading migrations from {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".sql"))
        .collect();
    names.sort();

    println!("Found {} migration(s) to run", names.len());

    let mut tx = pool.begin().await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (
            id SERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            run_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(&mut *tx)
    .await?;

    let completed: Vec<String> = sqlx::query_scalar("SELECT name FROM migrations")
        .fetch_all(&mut *tx)
        .await?;

    for name in &names {
        if completed.contains(name) {
            println!("Skipping already run migration: {name}");
            continue;
        }

        println!("Running migration: {name}");

        let sql = fs::read_to_string(dir.join(name))
            .with_context(|| format!("reading migration {name}"))?;
        sqlx::raw_sql(&sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("applying migration {name}"))?;
        sqlx::query("INSERT INTO migrations (name) VALUES ($1)")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        println!("Completed migration: {name}");
    }

    tx.commit().await?;
    println!("All migrations completed successfully");

    Ok(())
}
