#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr, SqlxPostgresConnector};

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Open the connection pool described by the configuration.
#[cfg(feature = "postgres")]
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, DbErr> {
    tracing::info!("Initializing database connection...");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .to_owned();

    let conn = Database::connect(opts).await?;
    tracing::info!("Database connected (pool: {})", config.max_connections);

    Ok(conn)
}

/// Duplicate a connection handle, sharing the same underlying pool.
///
/// Equivalent to `DbConn::clone`, but does not rely on the `Clone` impl,
/// which sea-orm disables when its `mock` feature is active (e.g. during
/// workspace test builds).
#[cfg(feature = "postgres")]
pub fn clone_conn(conn: &DbConn) -> DbConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(conn.get_postgres_connection_pool().clone())
}
