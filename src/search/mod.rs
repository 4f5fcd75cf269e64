//! Batch IP-to-country search

pub mod batch;
pub mod models;
pub mod validator;
pub mod worker;

pub use batch::BatchSearcher;
pub use models::{CountryInfo, LookupFailure, LookupOutcome, ResponseEnvelope, SearchRequest};
pub use validator::{is_valid_ipv4, parse_ipv4};
pub use worker::lookup_country;
