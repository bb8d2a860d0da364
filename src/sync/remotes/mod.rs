//! Remote implementations for fetching published documents

pub mod http;

pub use http::HttpRemote;
