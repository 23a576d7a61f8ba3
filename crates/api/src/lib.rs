//! Steam exporter HTTP server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! exposition) so integration tests and the binary entrypoint can both
//! access them.

pub mod config;
pub mod error;
pub mod exposition;
pub mod router;
pub mod routes;
pub mod state;
