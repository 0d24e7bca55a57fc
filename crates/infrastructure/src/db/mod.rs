//! Database pool construction and schema bootstrap.
//!
//! The backend (PostgreSQL, MySQL or SQLite) is whichever one the settings
//! resolver picked at startup, so everything here goes through the sqlx `Any`
//! driver and sticks to its portable type set: integers, floats and text.
//! Dates are stored as ISO-8601 text, booleans as 0/1.

use std::time::Duration;

use config::{DatabaseEngine, DatabaseSettings};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

pub mod repositories;

const MAX_CONNECTIONS: u32 = 5;

pub async fn create_pool(settings: &DatabaseSettings) -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let mut options = AnyPoolOptions::new().max_connections(MAX_CONNECTIONS);
    if let Some(age) = settings.conn_max_age() {
        options = options.max_lifetime(Duration::from_secs(age));
    }

    let pool = options.connect(&settings.connection_url()).await?;
    tracing::info!(engine = ?settings.engine(), "database connection established");
    Ok(pool)
}

/// Create the tables if they do not exist yet. Only the auto-increment id
/// column differs between backends.
pub async fn ensure_schema(pool: &AnyPool, engine: DatabaseEngine) -> Result<(), sqlx::Error> {
    let id_column = match engine {
        DatabaseEngine::Postgres => "BIGSERIAL PRIMARY KEY",
        DatabaseEngine::MySql => "BIGINT PRIMARY KEY AUTO_INCREMENT",
        DatabaseEngine::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
    };

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS blog_posts (
            id {id_column},
            name VARCHAR(20) NOT NULL,
            email VARCHAR(30),
            subject VARCHAR(20) NOT NULL,
            date VARCHAR(10) NOT NULL,
            description TEXT NOT NULL
        )"
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS users (
            id {id_column},
            username VARCHAR(150) NOT NULL UNIQUE,
            email VARCHAR(254) NOT NULL,
            password VARCHAR(128) NOT NULL,
            is_staff BIGINT NOT NULL DEFAULT 0,
            is_active BIGINT NOT NULL DEFAULT 1,
            date_joined VARCHAR(40) NOT NULL
        )"
    ))
    .execute(pool)
    .await?;

    Ok(())
}

/// Bind-parameter marker for the given backend: `$n` on PostgreSQL, `?`
/// elsewhere.
pub(crate) fn placeholder(engine: DatabaseEngine, n: usize) -> String {
    match engine {
        DatabaseEngine::Postgres => format!("${n}"),
        DatabaseEngine::MySql | DatabaseEngine::Sqlite => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_per_engine() {
        assert_eq!(placeholder(DatabaseEngine::Postgres, 3), "$3");
        assert_eq!(placeholder(DatabaseEngine::MySql, 3), "?");
        assert_eq!(placeholder(DatabaseEngine::Sqlite, 1), "?");
    }
}
