//! # amplifyx-server
//!
//! HTTP API for the AmplifyX SEO toolkit. Every route is a thin wrapper
//! around `amplifyx-core`: fetch, extract, serialize.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::build_router;
pub use state::{AppState, SharedState};
