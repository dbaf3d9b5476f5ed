//! Integration Tests for the Joke Counter
//!
//! This crate contains various test modules:
//!
//! - `counter_flow_tests`: Multi-witness voting sessions against the shared counter
//! - `report_cycle_tests`: Report pipeline runs against real files on disk
//! - `http_api_tests`: Full request flows over the assembled HTTP router
//! - `config_tests`: Configuration loading from TOML files
//! - `support`: Shared helpers (router assembly, agreement drivers)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```
//!
//! The suite needs no running server and no network; HTTP tests drive the
//! router in-process and report tests write into temporary directories.


#[cfg(test)]
mod report_cycle_tests;


#[cfg(test)]
mod config_tests;

/// Shared helpers for integration tests
pub mod support;
