//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Path to the JSON record store document (default: ./db.json).
    pub data_file: PathBuf,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Page size when a query gives none (default: 20).
    pub default_page_limit: i64,

    /// Largest page size a query may request (default: 100).
    pub max_page_limit: i64,

    /// How long loaded collections stay cached (default: 5 seconds).
    pub store_cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            data_file: PathBuf::from("./db.json"),
            cors_allowed_origins: vec!["*".to_string()],
            default_page_limit: 20,
            max_page_limit: 100,
            store_cache_ttl: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let data_file = env::var("DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./db.json"));

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let default_page_limit: i64 = env::var("DEFAULT_PAGE_LIMIT")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .context("DEFAULT_PAGE_LIMIT must be a valid integer")?;

        let max_page_limit: i64 = env::var("MAX_PAGE_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .context("MAX_PAGE_LIMIT must be a valid integer")?;

        if default_page_limit <= 0 || max_page_limit <= 0 {
            bail!("page limits must be positive");
        }
        if default_page_limit > max_page_limit {
            bail!("DEFAULT_PAGE_LIMIT ({default_page_limit}) exceeds MAX_PAGE_LIMIT ({max_page_limit})");
        }

        let store_cache_ttl = env::var("STORE_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("STORE_CACHE_TTL_SECS must be a valid u64")?;

        Ok(Self {
            port,
            data_file,
            cors_allowed_origins,
            default_page_limit,
            max_page_limit,
            store_cache_ttl,
        })
    }
}
