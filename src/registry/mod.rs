//! Activity registry for the signup service
//!
//! This module owns the activity catalog, the signup rules, and the email
//! validation those rules depend on.

pub mod catalog;
pub mod email;
pub mod store;

// Re-export commonly used types
pub use catalog::{ActivitySeed, CatalogProvider, StaticCatalogProvider};
pub use email::{require_domain, validate_email};
pub use store::{ActivityRegistry, RegistryStats};
