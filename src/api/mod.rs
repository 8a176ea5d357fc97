//! HTTP API module.

pub mod handlers;

pub use handlers::AppState;
