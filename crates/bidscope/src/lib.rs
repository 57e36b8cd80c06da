// Library root: re-exports all modules so integration tests and the CLI can
// reach the crate's public API.

pub mod baseline;
pub mod config;
pub mod inflation;
pub mod position;
pub mod valuation;
