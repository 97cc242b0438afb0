//! HTTP API exposed to the matrix UI.
//!
//! Handlers translate requests into store operations and errors into
//! status codes; no classification or reconciliation logic lives here.

pub mod routes;
pub mod tasks;

pub use routes::{serve, AppState};
