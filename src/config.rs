use std::env;
use std::net::SocketAddr;

use crate::error::AppError;
use crate::extraction::ExtractionConfig;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://studyplan.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub extraction: ExtractionConfig,
}

impl AppConfig {
    /// Reads settings from the environment (and `.env`, when present).
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is not a socket address: {}", e)))?;
        let extraction = ExtractionConfig::new_from_env()?;

        Ok(Self {
            database_url,
            bind_addr,
            extraction,
        })
    }
}
