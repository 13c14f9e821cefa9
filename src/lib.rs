//! Mergington Activities - extracurricular signup service
//!
//! This crate provides an in-memory activity registry with the school's
//! signup rules, exposed over HTTP with axum alongside health and Prometheus
//! endpoints.

pub mod config;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod service;
pub mod types;
pub mod web;

// Re-export commonly used types
pub use error::{CatalogError, RegistryError, Result};
pub use types::*;

// Re-export key components
pub use registry::{ActivityRegistry, CatalogProvider, StaticCatalogProvider};
pub use service::AppState;
pub use web::{create_router, HttpServer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
