//! HTTP handlers translating requests into file store calls

pub mod files;
pub mod health;
pub mod routes;
