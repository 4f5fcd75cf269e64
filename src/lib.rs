pub mod api;
pub mod config;
pub mod geoip;
pub mod search;
