//! Student email validation
//!
//! Syntax checks follow the common subset of RFC 5322 that mail providers
//! actually accept: dot-atom local parts and LDH domain labels. Quoted local
//! parts and address literals are rejected.

use crate::error::RegistryError;
use regex::Regex;
use std::sync::LazyLock;

const MAX_LOCAL_PART_LEN: usize = 64;
const MAX_ADDRESS_LEN: usize = 254;
const MAX_LABEL_LEN: usize = 63;

static LOCAL_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+$").expect("local part pattern is valid")
});

static DOMAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$")
        .expect("domain label pattern is valid")
});

fn invalid(email: &str, reason: &str) -> RegistryError {
    RegistryError::InvalidEmail {
        email: email.to_string(),
        reason: reason.to_string(),
    }
}

/// Check that `email` is a syntactically valid address
pub fn validate_email(email: &str) -> Result<(), RegistryError> {
    if email.is_empty() {
        return Err(invalid(email, "value is empty"));
    }
    if email.len() > MAX_ADDRESS_LEN {
        return Err(invalid(email, "address is too long"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid(email, "address contains whitespace"));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(invalid(email, "missing '@' sign")),
    };
    if domain.contains('@') {
        return Err(invalid(email, "more than one '@' sign"));
    }

    if local.is_empty() {
        return Err(invalid(email, "nothing before the '@' sign"));
    }
    if local.len() > MAX_LOCAL_PART_LEN {
        return Err(invalid(email, "part before the '@' sign is too long"));
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(invalid(email, "misplaced '.' before the '@' sign"));
    }
    if !LOCAL_PART.is_match(local) {
        return Err(invalid(email, "invalid characters before the '@' sign"));
    }

    validate_domain(email, domain)
}

fn validate_domain(email: &str, domain: &str) -> Result<(), RegistryError> {
    if domain.is_empty() {
        return Err(invalid(email, "nothing after the '@' sign"));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid(email, "domain must contain a '.'"));
    }

    for label in &labels {
        if label.is_empty() || label.len() > MAX_LABEL_LEN || !DOMAIN_LABEL.is_match(label) {
            return Err(invalid(email, "invalid domain name"));
        }
    }

    if let Some(tld) = labels.last() {
        if tld.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid(email, "domain must end with a top-level name"));
        }
    }

    Ok(())
}

/// Domain part of an address, if it has one
pub fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

/// Check the address belongs to `required_domain`, ignoring case
pub fn require_domain(email: &str, required_domain: &str) -> Result<(), RegistryError> {
    match email_domain(email) {
        Some(domain) if domain.eq_ignore_ascii_case(required_domain) => Ok(()),
        _ => Err(RegistryError::WrongDomain {
            email: email.to_string(),
            domain: required_domain.to_string(),
        }),
    }
}

/// Comparison key for duplicate detection
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}
