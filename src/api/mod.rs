//! HTTP API layer: routes, handlers, request/response types, error mapping.

pub mod error;
pub mod handlers;
pub mod models;
pub mod server;

pub use error::ApiError;
pub use server::{start_http_server, AppState};
