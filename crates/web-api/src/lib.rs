//! Web API layer.
//!
//! Axum routes delegating HTTP requests to the application services, plus JWT
//! issuance and the security middleware derived from the runtime settings.

mod auth;
mod error;
mod routes;
mod security;
mod state;

#[cfg(test)]
mod routes_tests;

pub use auth::{Claims, TokenPair, TokenService};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
