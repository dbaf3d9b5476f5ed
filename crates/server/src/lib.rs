//! HTTP surface of the joke counter: route handlers and middleware.
//!
//! The binary in `main.rs` wires these modules to the counter and report
//! pipeline from `counter_core`.

pub mod middleware;
pub mod router;
