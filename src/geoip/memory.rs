use std::collections::HashMap;
use std::net::IpAddr;

use super::{GeoError, GeoLookup, GeoRecord, GeoResult};

/// Exact-address lookup table, used in tests and local fixtures
#[derive(Debug, Clone, Default)]
pub struct InMemoryGeoDatabase {
    records: HashMap<IpAddr, GeoRecord>,
}

impl InMemoryGeoDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a country for `ip` with the given `(lang, name)` pairs
    pub fn with_country(
        mut self,
        ip: IpAddr,
        iso_code: &str,
        continent_code: &str,
        names: &[(&str, &str)],
    ) -> Self {
        let names = names
            .iter()
            .map(|(lang, name)| (lang.to_string(), name.to_string()))
            .collect();

        self.records.insert(
            ip,
            GeoRecord {
                iso_code: iso_code.to_string(),
                names,
                continent_code: continent_code.to_string(),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl GeoLookup for InMemoryGeoDatabase {
    fn lookup(&self, ip: IpAddr) -> GeoResult<GeoRecord> {
        self.records.get(&ip).cloned().ok_or(GeoError::NotFound(ip))
    }
}
