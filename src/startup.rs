use crate::config::Config;
use crate::db::{self, DbPool};
use anyhow::Context;

/// Opens the database, brings its schema up to date and makes sure the
/// upload directory exists.
pub fn prepare(config: &Config) -> anyhow::Result<DbPool> {
    let pool = db::create_pool(&config.database_url)
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    let mut conn = pool.get()?;
    db::run_migrations(&mut conn)?;
    tracing::info!("Database migrations completed");

    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!(
            "Failed to create upload folder {}",
            config.upload_dir.display()
        )
    })?;
    tracing::info!("Uploads stored in {}", config.upload_dir.display());

    Ok(pool)
}
