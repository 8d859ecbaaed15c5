//! Learnloop engagement API library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! background scheduler, email delivery) so integration tests and the binary
//! entrypoint can both access them.

pub mod auth;
pub mod background;
pub mod config;
pub mod email;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
