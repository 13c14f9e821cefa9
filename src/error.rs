//! Error types for the activity signup service
//!
//! Process-level failures use anyhow; the business rules of the signup flow
//! are expressed as `RegistryError` so the web layer can map them to status
//! codes without string matching.

use axum::http::StatusCode;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Client-facing failures of the activity registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid email address '{email}': {reason}")]
    InvalidEmail { email: String, reason: String },

    #[error("Email '{email}' is not on the {domain} domain")]
    WrongDomain { email: String, domain: String },

    #[error("Activity not found: {name}")]
    ActivityNotFound { name: String },

    #[error("'{email}' is already signed up for {activity}")]
    AlreadySignedUp { email: String, activity: String },

    #[error("Activity is full: {activity} (capacity {capacity})")]
    ActivityFull { activity: String, capacity: usize },
}

/// Problems with the activity catalog detected at startup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid seed for activity '{name}': {message}")]
    InvalidSeed { name: String, message: String },

    #[error("Duplicate activity name in catalog: {name}")]
    DuplicateActivity { name: String },

    #[error("Catalog is empty")]
    Empty,
}

impl RegistryError {
    /// HTTP status the error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::InvalidEmail { .. } | RegistryError::WrongDomain { .. } => {
                StatusCode::BAD_REQUEST
            }
            RegistryError::ActivityNotFound { .. } => StatusCode::NOT_FOUND,
            RegistryError::AlreadySignedUp { .. } | RegistryError::ActivityFull { .. } => {
                StatusCode::CONFLICT
            }
        }
    }

    /// Short message returned to the caller in the `detail` field
    pub fn detail(&self) -> String {
        match self {
            RegistryError::InvalidEmail { email, .. } if email.is_empty() => {
                "Email is required".to_string()
            }
            RegistryError::InvalidEmail { reason, .. } => {
                format!("Invalid email address: {}", reason)
            }
            RegistryError::WrongDomain { domain, .. } => format!("Email must be @{}", domain),
            RegistryError::ActivityNotFound { .. } => "Activity not found".to_string(),
            RegistryError::AlreadySignedUp { .. } => "Student already signed up".to_string(),
            RegistryError::ActivityFull { .. } => "Activity is full".to_string(),
        }
    }

    /// Label used for the signup outcome metric
    pub fn outcome(&self) -> &'static str {
        match self {
            RegistryError::InvalidEmail { .. } => "invalid_email",
            RegistryError::WrongDomain { .. } => "wrong_domain",
            RegistryError::ActivityNotFound { .. } => "not_found",
            RegistryError::AlreadySignedUp { .. } => "already_signed_up",
            RegistryError::ActivityFull { .. } => "full",
        }
    }
}
