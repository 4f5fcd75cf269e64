//! Memory-mapped reader for DB-IP / MaxMind country databases
//!
//! The reader is opened once at startup and shared read-only across
//! requests. It is unmapped when the last `Arc` owner drops it.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use maxminddb::{Mmap, Reader};
use serde::Deserialize;

use super::{GeoError, GeoLookup, GeoRecord, GeoResult};

/// Subset of the country record layout we decode.
/// Fields absent from a record decode as empty values.
#[derive(Debug, Default, Deserialize)]
struct CountryRecord {
    #[serde(default)]
    country: CountryFields,
    #[serde(default)]
    continent: ContinentFields,
}

#[derive(Debug, Default, Deserialize)]
struct CountryFields {
    #[serde(default)]
    iso_code: String,
    #[serde(default)]
    names: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContinentFields {
    #[serde(default)]
    code: String,
}

impl From<CountryRecord> for GeoRecord {
    fn from(record: CountryRecord) -> Self {
        GeoRecord {
            iso_code: record.country.iso_code,
            names: record.country.names,
            continent_code: record.continent.code,
        }
    }
}

/// Database metadata reported at startup
#[derive(Debug, Clone)]
pub struct DatabaseInfo {
    pub database_type: String,
    pub build_epoch: u64,
    pub node_count: u32,
}

/// GeoIP country database backed by a memory-mapped `.mmdb` file
#[derive(Clone)]
pub struct MaxMindDatabase {
    path: PathBuf,
    reader: Arc<Reader<Mmap>>,
}

impl MaxMindDatabase {
    /// Open and memory-map the database at `path`
    ///
    /// Fails if the file is missing or is not a valid MaxMind database.
    pub fn open(path: impl AsRef<Path>) -> GeoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = unsafe { Reader::open_mmap(&path) }.map_err(|source| GeoError::Open {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            reader: Arc::new(reader),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> DatabaseInfo {
        let metadata = &self.reader.metadata;
        DatabaseInfo {
            database_type: metadata.database_type.clone(),
            build_epoch: metadata.build_epoch,
            node_count: metadata.node_count,
        }
    }
}

impl GeoLookup for MaxMindDatabase {
    fn lookup(&self, ip: IpAddr) -> GeoResult<GeoRecord> {
        let result = self.reader.lookup(ip)?;
        let record: Option<CountryRecord> = result.decode()?;
        record.map(GeoRecord::from).ok_or(GeoError::NotFound(ip))
    }
}
