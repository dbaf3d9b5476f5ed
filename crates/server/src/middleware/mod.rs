//! HTTP middleware for the counter server.
//!
//! Witness identity (who is voting) is decided in the router, not here; this
//! module only carries transport plumbing shared by every route.

pub mod request_id;

pub use request_id::{create_request_id_layers, UuidRequestIdGenerator, X_REQUEST_ID};
