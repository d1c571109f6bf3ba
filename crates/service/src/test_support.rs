#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::connect_with_config;
use configs::DatabaseConfig;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> Option<DatabaseConfig> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(DatabaseConfig { url, min_connections: 1, max_connections: 5, ..Default::default() })
}

/// A migrated Postgres connection, or `None` when no database is configured
/// (`DATABASE_URL` unset or `SKIP_DB_TESTS` set).
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    let Some(cfg) = test_config() else {
        eprintln!("skip: DATABASE_URL missing or SKIP_DB_TESTS set");
        return Ok(None);
    };

    // Run migrations exactly once, with a throwaway connection
    let migrated = MIGRATED
        .get_or_init(|| async {
            match connect_with_config(&cfg).await {
                Ok(db) => migration::Migrator::up(&db, None).await.is_ok(),
                Err(_) => false,
            }
        })
        .await;
    if !*migrated {
        return Err(anyhow::anyhow!("database configured but migrations failed"));
    }

    // Return a fresh connection for the current test's runtime
    let db = connect_with_config(&cfg).await?;
    Ok(Some(db))
}
