use std::net::IpAddr;

use tracing::{debug, warn};

use super::models::{CountryInfo, LookupFailure, LookupOutcome};
use super::validator::parse_ipv4;
use crate::geoip::GeoLookup;

/// Resolve one address to its country
///
/// Failures are reported per item and never abort the batch.
pub fn lookup_country(db: &dyn GeoLookup, ip: &str, lang: &str) -> LookupOutcome {
    let Some(addr) = parse_ipv4(ip).map(IpAddr::V4) else {
        warn!(ip = %ip, "failed to parse address");
        return LookupOutcome::Failed(LookupFailure {
            ip: ip.to_string(),
            reason: "invalid IPv4 address".to_string(),
        });
    };

    match db.lookup(addr) {
        Ok(record) => {
            debug!(ip = %ip, iso_code = %record.iso_code, "lookup hit");
            LookupOutcome::Found(CountryInfo {
                ip: ip.to_string(),
                country_name: record.localized_name(lang).to_string(),
                iso_code: record.iso_code,
            })
        }
        Err(e) => {
            warn!(ip = %ip, error = %e, "lookup failed");
            LookupOutcome::Failed(LookupFailure {
                ip: ip.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
