//! Configuration for Catalog API

use core_config::{
    AppInfo, FromEnv, app_info, catalog::CatalogConfig, database::DatabaseConfig,
    server::ServerConfig,
};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            catalog: CatalogConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }
}
