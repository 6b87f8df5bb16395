//! Admin service for managing users, their profile metadata and associations
//!
//! The binary in `main.rs` wires these modules into an axum server; the
//! library target exposes them to the integration tests.

pub mod config;
pub mod error;
pub mod hashing;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod store;
pub mod sync;
pub mod validation;
