//! Country lookups against an offline MaxMind-format database
//!
//! The search path only depends on [`GeoLookup`]. The production
//! implementation is a memory-mapped `.mmdb` reader; an in-memory table
//! implements the same trait for tests and fixtures.

pub mod maxmind;
pub mod memory;

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use maxmind::{DatabaseInfo, MaxMindDatabase};
pub use memory::InMemoryGeoDatabase;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("failed to open GeoIP database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: maxminddb::MaxMindDbError,
    },
    #[error("no record for {0}")]
    NotFound(IpAddr),
    #[error(transparent)]
    Database(#[from] maxminddb::MaxMindDbError),
}

pub type GeoResult<T> = Result<T, GeoError>;

/// Country-level record for a single address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRecord {
    /// ISO 3166-1 alpha-2 code (e.g. "US")
    pub iso_code: String,
    /// Country names keyed by language tag ("en", "de", "zh-CN", ...)
    pub names: HashMap<String, String>,
    /// Two letter continent code (e.g. "NA")
    pub continent_code: String,
}

impl GeoRecord {
    /// Localized country name, or an empty string when the record has
    /// no name for `lang`
    pub fn localized_name(&self, lang: &str) -> &str {
        self.names.get(lang).map(String::as_str).unwrap_or_default()
    }
}

/// Read-only lookup shared by every worker of every batch
pub trait GeoLookup: Send + Sync {
    fn lookup(&self, ip: IpAddr) -> GeoResult<GeoRecord>;
}
