use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub geoip: GeoIpConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// Path to the country .mmdb file.
    /// Relative paths are resolved against the working directory.
    pub db_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Language tag used to pick the localized country name (e.g. "en", "zh-CN")
    pub lang: String,
    /// Upper bound on lookups running at the same time, shared by all requests
    pub max_concurrent_lookups: usize,
}

impl ServerConfig {
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 9999;

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl GeoIpConfig {
    pub const DEFAULT_DB_PATH: &'static str = "db/dbip-country-lite-2019-12.mmdb";
}

impl SearchConfig {
    pub const DEFAULT_LANG: &'static str = "en";
    pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 64;
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            lang: Self::DEFAULT_LANG.to_string(),
            max_concurrent_lookups: Self::DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host =
            std::env::var("API_HOST").unwrap_or_else(|_| ServerConfig::DEFAULT_HOST.to_string());
        let port = match std::env::var("API_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("API_PORT must be a valid port number, got '{v}'"))?,
            Err(_) => ServerConfig::DEFAULT_PORT,
        };

        let db_path = std::env::var("GEOIP_DB_PATH")
            .unwrap_or_else(|_| GeoIpConfig::DEFAULT_DB_PATH.to_string());
        let db_path = resolve_db_path(PathBuf::from(db_path))?;

        let lang = parse_lang(std::env::var("INFO_LANG").ok());

        let max_concurrent_lookups =
            parse_max_concurrent(std::env::var("MAX_CONCURRENT_LOOKUPS").ok().as_deref());

        Ok(Config {
            server: ServerConfig { host, port },
            geoip: GeoIpConfig { db_path },
            search: SearchConfig {
                lang,
                max_concurrent_lookups,
            },
        })
    }
}

/// Anchor a relative database path at the current working directory
pub fn resolve_db_path(path: PathBuf) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }

    let cwd = std::env::current_dir().context("Failed to read the current working directory")?;
    Ok(cwd.join(path))
}

/// Set-but-empty counts as unset
fn parse_lang(raw: Option<String>) -> String {
    raw.filter(|v| !v.is_empty())
        .unwrap_or_else(|| SearchConfig::DEFAULT_LANG.to_string())
}

fn parse_max_concurrent(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return SearchConfig::DEFAULT_MAX_CONCURRENT_LOOKUPS;
    };

    match raw.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            tracing::warn!(
                "Invalid MAX_CONCURRENT_LOOKUPS '{raw}', falling back to {}",
                SearchConfig::DEFAULT_MAX_CONCURRENT_LOOKUPS
            );
            SearchConfig::DEFAULT_MAX_CONCURRENT_LOOKUPS
        }
    }
}
