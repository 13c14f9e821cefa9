//! Activity catalog providers
//!
//! The catalog is fixed for the lifetime of the process. Providers hand the
//! registry a list of seeds once at startup; every seed is checked against
//! the same rules the signup flow enforces before the registry accepts it.

use crate::error::{CatalogError, Result};
use crate::registry::email::{normalize_email, require_domain, validate_email};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Definition of one activity as loaded at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySeed {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: usize,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl ActivitySeed {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schedule: impl Into<String>,
        max_participants: usize,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schedule: schedule.into(),
            max_participants,
            participants: Vec::new(),
        }
    }

    /// Add initial participants
    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }
}

/// Source of the activities the registry is built from
#[cfg_attr(test, mockall::automock)]
pub trait CatalogProvider: Send + Sync {
    /// Seeds in the order they should be listed
    fn seeds(&self) -> Vec<ActivitySeed>;

    /// Name used in startup logs
    fn source_name(&self) -> String;
}

/// The school's built-in activity catalog
#[derive(Debug, Clone)]
pub struct StaticCatalogProvider {
    seeds: Vec<ActivitySeed>,
}

impl StaticCatalogProvider {
    pub fn new() -> Self {
        Self {
            seeds: vec![
                ActivitySeed::new(
                    "Chess Club",
                    "Learn strategies and compete in chess tournaments",
                    "Fridays, 3:30 PM - 5:00 PM",
                    12,
                )
                .with_participants(["michael@mergington.edu", "daniel@mergington.edu"]),
                ActivitySeed::new(
                    "Programming Class",
                    "Learn programming fundamentals and build software projects",
                    "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
                    20,
                )
                .with_participants(["emma@mergington.edu", "sophia@mergington.edu"]),
                ActivitySeed::new(
                    "Gym Class",
                    "Physical education and sports activities",
                    "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
                    30,
                )
                .with_participants(["john@mergington.edu", "olivia@mergington.edu"]),
            ],
        }
    }

    /// Use a custom set of seeds instead of the built-in catalog
    pub fn with_seeds(seeds: Vec<ActivitySeed>) -> Self {
        Self { seeds }
    }
}

impl Default for StaticCatalogProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogProvider for StaticCatalogProvider {
    fn seeds(&self) -> Vec<ActivitySeed> {
        self.seeds.clone()
    }

    fn source_name(&self) -> String {
        "static".to_string()
    }
}

/// Check a single seed against the registry invariants
pub fn validate_seed(seed: &ActivitySeed, required_domain: &str) -> Result<()> {
    let fail = |message: String| -> anyhow::Error {
        CatalogError::InvalidSeed {
            name: seed.name.clone(),
            message,
        }
        .into()
    };

    if seed.name.trim().is_empty() {
        return Err(fail("Activity name cannot be empty".to_string()));
    }

    if seed.max_participants == 0 {
        return Err(fail("Capacity must be greater than 0".to_string()));
    }

    if seed.participants.len() > seed.max_participants {
        return Err(fail(format!(
            "{} participants exceed capacity {}",
            seed.participants.len(),
            seed.max_participants
        )));
    }

    let mut seen = HashSet::new();
    for email in &seed.participants {
        validate_email(email).map_err(|e| fail(e.to_string()))?;
        require_domain(email, required_domain).map_err(|e| fail(e.to_string()))?;

        if !seen.insert(normalize_email(email)) {
            return Err(fail(format!("Duplicate participant {}", email)));
        }
    }

    Ok(())
}

/// Check a whole catalog, including name uniqueness across seeds
pub fn validate_catalog(seeds: &[ActivitySeed], required_domain: &str) -> Result<()> {
    if seeds.is_empty() {
        return Err(CatalogError::Empty.into());
    }

    let mut names = HashSet::new();
    for seed in seeds {
        validate_seed(seed, required_domain)?;

        if !names.insert(seed.name.as_str()) {
            return Err(CatalogError::DuplicateActivity {
                name: seed.name.clone(),
            }
            .into());
        }
    }

    Ok(())
}
