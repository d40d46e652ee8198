//! Phantom studio API server library.
//!
//! Exposes the building blocks (config, session state, error handling,
//! routes, background tasks) so integration tests and the binary
//! entrypoint share the same wiring.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
