use serde::{Deserialize, Serialize};

/// Country information for one looked-up address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    pub ip: String,
    #[serde(rename = "isoCode")]
    pub iso_code: String,
    #[serde(rename = "country")]
    pub country_name: String,
}

/// A valid address whose lookup did not produce a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupFailure {
    pub ip: String,
    pub reason: String,
}

/// Result of a single worker
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Found(CountryInfo),
    Failed(LookupFailure),
}

impl LookupOutcome {
    pub fn ip(&self) -> &str {
        match self {
            LookupOutcome::Found(info) => &info.ip,
            LookupOutcome::Failed(failure) => &failure.ip,
        }
    }
}

/// JSON envelope returned for every search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: i8,
    #[serde(default)]
    pub data: Vec<CountryInfo>,
    #[serde(default)]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<LookupFailure>,
}

impl ResponseEnvelope {
    pub const SUCCESS: i8 = 1;
    pub const BAD_REQUEST: i8 = -3;

    pub fn success(data: Vec<CountryInfo>, errors: Vec<LookupFailure>) -> Self {
        Self {
            status_code: Self::SUCCESS,
            data,
            msg: String::new(),
            errors,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status_code: Self::BAD_REQUEST,
            data: Vec::new(),
            msg: msg.into(),
            errors: Vec::new(),
        }
    }
}

/// POST body: `{"ip": ["1.2.3.4", ...]}`
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub ip: Option<Vec<String>>,
}

impl SearchRequest {
    pub fn into_ips(self) -> Vec<String> {
        self.ip.unwrap_or_default()
    }
}
