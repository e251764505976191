//! Postgres pool setup

use core_config::database::DatabaseConfig;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(&config.url);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .sqlx_logging(config.sql_logging);
    opt
}

/// Open the pool and, when enabled, bring the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> eyre::Result<DatabaseConnection> {
    let db = Database::connect(connect_options(config)).await?;
    info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );

    if config.run_migrations {
        Migrator::up(&db, None).await?;
        info!("Database migrations applied");
    }

    Ok(db)
}
