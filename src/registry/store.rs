//! In-memory activity registry
//!
//! Activities keep their catalog order. Each roster has its own lock, and a
//! signup holds that lock across the duplicate check, the capacity check and
//! the append, so two concurrent signups for the last seat cannot both win.

use crate::error::{RegistryError, Result};
use crate::registry::catalog::{validate_catalog, ActivitySeed, CatalogProvider};
use crate::registry::email::{normalize_email, require_domain, validate_email};
use crate::types::{Activity, SignupConfirmation};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Point-in-time counters for health and metrics reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of activities in the catalog
    pub activities: usize,
    /// Participants across all activities
    pub total_participants: usize,
    /// Capacity across all activities
    pub total_capacity: usize,
    /// Signups accepted since startup
    pub signups_accepted: u64,
    /// Signups rejected since startup, for any reason
    pub signups_rejected: u64,
}

struct ActivitySlot {
    name: String,
    description: String,
    schedule: String,
    max_participants: usize,
    participants: Mutex<Vec<String>>,
}

impl ActivitySlot {
    fn from_seed(seed: ActivitySeed) -> Self {
        Self {
            name: seed.name,
            description: seed.description,
            schedule: seed.schedule,
            max_participants: seed.max_participants,
            participants: Mutex::new(seed.participants),
        }
    }

    async fn snapshot(&self) -> Activity {
        let participants = self.participants.lock().await.clone();
        Activity {
            name: self.name.clone(),
            description: self.description.clone(),
            schedule: self.schedule.clone(),
            max_participants: self.max_participants,
            participants,
        }
    }
}

/// Registry of all activities and their rosters
pub struct ActivityRegistry {
    slots: Vec<ActivitySlot>,
    /// Exact name -> position in `slots`
    index: HashMap<String, usize>,
    required_domain: String,
    signups_accepted: AtomicU64,
    signups_rejected: AtomicU64,
}

impl ActivityRegistry {
    /// Build a registry from a catalog provider
    pub fn from_provider(
        provider: &dyn CatalogProvider,
        required_domain: impl Into<String>,
    ) -> Result<Self> {
        let seeds = provider.seeds();
        info!(
            "Loading {} activities from {} catalog",
            seeds.len(),
            provider.source_name()
        );
        Self::from_seeds(seeds, required_domain)
    }

    /// Build a registry from explicit seeds
    pub fn from_seeds(
        seeds: Vec<ActivitySeed>,
        required_domain: impl Into<String>,
    ) -> Result<Self> {
        let required_domain = required_domain.into();
        validate_catalog(&seeds, &required_domain)?;

        let mut index = HashMap::with_capacity(seeds.len());
        let mut slots = Vec::with_capacity(seeds.len());
        for (position, seed) in seeds.into_iter().enumerate() {
            debug!(
                "Registering activity '{}' ({}/{} participants)",
                seed.name,
                seed.participants.len(),
                seed.max_participants
            );
            index.insert(seed.name.clone(), position);
            slots.push(ActivitySlot::from_seed(seed));
        }

        Ok(Self {
            slots,
            index,
            required_domain,
            signups_accepted: AtomicU64::new(0),
            signups_rejected: AtomicU64::new(0),
        })
    }

    /// Domain every participant address must belong to
    pub fn required_domain(&self) -> &str {
        &self.required_domain
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Activity names in catalog order
    pub fn activity_names(&self) -> Vec<String> {
        self.slots.iter().map(|slot| slot.name.clone()).collect()
    }

    /// Exact key lookup first, then an O(n) case-insensitive scan in catalog
    /// order.
    fn resolve(&self, name: &str) -> Option<&ActivitySlot> {
        if let Some(&position) = self.index.get(name) {
            return self.slots.get(position);
        }

        let wanted = name.to_lowercase();
        self.slots
            .iter()
            .find(|slot| slot.name.to_lowercase() == wanted)
    }

    /// Snapshot of every activity in catalog order
    pub async fn list_activities(&self) -> Vec<Activity> {
        let mut activities = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            activities.push(slot.snapshot().await);
        }
        activities
    }

    /// Snapshot of one activity, resolved the same way signup resolves names
    pub async fn get_activity(&self, name: &str) -> std::result::Result<Activity, RegistryError> {
        match self.resolve(name) {
            Some(slot) => Ok(slot.snapshot().await),
            None => Err(RegistryError::ActivityNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Sign a student up for an activity
    ///
    /// Checks run in a fixed order: address syntax, address domain, activity
    /// lookup, duplicate signup, capacity. A failed signup never changes the
    /// roster.
    pub async fn signup(
        &self,
        activity_name: &str,
        email: &str,
    ) -> std::result::Result<SignupConfirmation, RegistryError> {
        let result = self.try_signup(activity_name, email).await;

        match &result {
            Ok(confirmation) => {
                self.signups_accepted.fetch_add(1, Ordering::Relaxed);
                info!(
                    "Signup accepted - activity: '{}', email: '{}', participants: {}/{}",
                    activity_name,
                    email,
                    confirmation.current_participants,
                    confirmation.max_participants
                );
            }
            Err(e) => {
                self.signups_rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Signup rejected - activity: '{}', email: '{}', reason: {}",
                    activity_name, email, e
                );
            }
        }

        result
    }

    async fn try_signup(
        &self,
        activity_name: &str,
        email: &str,
    ) -> std::result::Result<SignupConfirmation, RegistryError> {
        validate_email(email)?;
        require_domain(email, &self.required_domain)?;

        let slot = self
            .resolve(activity_name)
            .ok_or_else(|| RegistryError::ActivityNotFound {
                name: activity_name.to_string(),
            })?;

        let mut participants = slot.participants.lock().await;

        let key = normalize_email(email);
        if participants.iter().any(|p| normalize_email(p) == key) {
            return Err(RegistryError::AlreadySignedUp {
                email: email.to_string(),
                activity: slot.name.clone(),
            });
        }

        if participants.len() >= slot.max_participants {
            return Err(RegistryError::ActivityFull {
                activity: slot.name.clone(),
                capacity: slot.max_participants,
            });
        }

        participants.push(email.to_string());

        Ok(SignupConfirmation {
            message: format!("Signed up {} for {}", email, slot.name),
            current_participants: participants.len(),
            max_participants: slot.max_participants,
        })
    }

    /// Current registry statistics
    pub async fn stats(&self) -> RegistryStats {
        let mut total_participants = 0;
        let mut total_capacity = 0;
        for slot in &self.slots {
            total_participants += slot.participants.lock().await.len();
            total_capacity += slot.max_participants;
        }

        RegistryStats {
            activities: self.slots.len(),
            total_participants,
            total_capacity,
            signups_accepted: self.signups_accepted.load(Ordering::Relaxed),
            signups_rejected: self.signups_rejected.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::catalog::{MockCatalogProvider, StaticCatalogProvider};
    use std::sync::Arc;

    const DOMAIN: &str = "mergington.edu";

    fn seeded_registry() -> ActivityRegistry {
        ActivityRegistry::from_provider(&StaticCatalogProvider::new(), DOMAIN).unwrap()
    }

    fn tiny_registry(capacity: usize) -> ActivityRegistry {
        let seeds = vec![ActivitySeed::new("Robotics", "Build robots", "Thursdays", capacity)];
        ActivityRegistry::from_seeds(seeds, DOMAIN).unwrap()
    }

    #[tokio::test]
    async fn test_list_preserves_catalog_order() {
        let registry = seeded_registry();
        let names: Vec<String> = registry
            .list_activities()
            .await
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Chess Club", "Programming Class", "Gym Class"]);
        assert_eq!(registry.activity_names(), names);
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test]
    async fn test_signup_success() {
        let registry = seeded_registry();

        let confirmation = registry
            .signup("Chess Club", "new@mergington.edu")
            .await
            .unwrap();

        assert_eq!(confirmation.current_participants, 3);
        assert_eq!(confirmation.max_participants, 12);
        assert_eq!(
            confirmation.message,
            "Signed up new@mergington.edu for Chess Club"
        );

        let chess = registry.get_activity("Chess Club").await.unwrap();
        assert_eq!(
            chess.participants.last().map(String::as_str),
            Some("new@mergington.edu")
        );
    }

    #[tokio::test]
    async fn test_case_insensitive_lookup() {
        let registry = seeded_registry();

        let confirmation = registry
            .signup("chess club", "x@mergington.edu")
            .await
            .unwrap();
        assert_eq!(confirmation.current_participants, 3);
        assert!(confirmation.message.ends_with("for Chess Club"));

        let chess = registry.get_activity("CHESS CLUB").await.unwrap();
        assert_eq!(chess.name, "Chess Club");
        assert!(chess.participants.contains(&"x@mergington.edu".to_string()));
    }

    #[tokio::test]
    async fn test_exact_match_wins_over_case_insensitive() {
        let seeds = vec![
            ActivitySeed::new("art", "Lowercase art", "Mondays", 5),
            ActivitySeed::new("Art", "Titlecase art", "Tuesdays", 5),
        ];
        let registry = ActivityRegistry::from_seeds(seeds, DOMAIN).unwrap();

        let exact = registry.get_activity("Art").await.unwrap();
        assert_eq!(exact.description, "Titlecase art");

        // No exact key: first case-insensitive match in catalog order
        let fallback = registry.get_activity("ART").await.unwrap();
        assert_eq!(fallback.description, "Lowercase art");
    }

    #[tokio::test]
    async fn test_unknown_activity() {
        let registry = seeded_registry();
        let result = registry.signup("Underwater Basket Weaving", "a@mergington.edu").await;
        assert!(matches!(result, Err(RegistryError::ActivityNotFound { .. })));
    }

    #[tokio::test]
    async fn test_validation_order() {
        let registry = seeded_registry();

        // Malformed address is reported before the unknown activity
        let result = registry.signup("Nope", "not-an-email").await;
        assert!(matches!(result, Err(RegistryError::InvalidEmail { .. })));

        // Wrong domain is reported before the unknown activity
        let result = registry.signup("Nope", "a@gmail.com").await;
        assert!(matches!(result, Err(RegistryError::WrongDomain { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_signup_rejected() {
        let registry = seeded_registry();

        registry
            .signup("Chess Club", "new@mergington.edu")
            .await
            .unwrap();
        let result = registry.signup("Chess Club", "new@mergington.edu").await;
        assert!(matches!(result, Err(RegistryError::AlreadySignedUp { .. })));

        // Case differences do not make a new student
        let result = registry.signup("Chess Club", "NEW@Mergington.EDU").await;
        assert!(matches!(result, Err(RegistryError::AlreadySignedUp { .. })));

        // Seed participants count too
        let result = registry.signup("Chess Club", "Michael@mergington.edu").await;
        assert!(matches!(result, Err(RegistryError::AlreadySignedUp { .. })));

        let chess = registry.get_activity("Chess Club").await.unwrap();
        assert_eq!(chess.participants.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_reported_before_full() {
        let seeds = vec![ActivitySeed::new("Robotics", "Build robots", "Thursdays", 1)
            .with_participants(["a@mergington.edu"])];
        let registry = ActivityRegistry::from_seeds(seeds, DOMAIN).unwrap();

        let result = registry.signup("Robotics", "a@mergington.edu").await;
        assert!(matches!(result, Err(RegistryError::AlreadySignedUp { .. })));

        let result = registry.signup("Robotics", "b@mergington.edu").await;
        assert!(matches!(result, Err(RegistryError::ActivityFull { .. })));
    }

    #[tokio::test]
    async fn test_capacity_enforced() {
        let registry = tiny_registry(3);

        for i in 0..3 {
            let email = format!("student{}@mergington.edu", i);
            let confirmation = registry.signup("Robotics", &email).await.unwrap();
            assert_eq!(confirmation.current_participants, i + 1);
        }

        let result = registry.signup("Robotics", "late@mergington.edu").await;
        assert_eq!(
            result,
            Err(RegistryError::ActivityFull {
                activity: "Robotics".to_string(),
                capacity: 3,
            })
        );

        let robotics = registry.get_activity("Robotics").await.unwrap();
        assert_eq!(robotics.participants.len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_signups_respect_capacity() {
        let registry = Arc::new(tiny_registry(5));

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    registry
                        .signup("Robotics", &format!("racer{}@mergington.edu", i))
                        .await
                })
            })
            .collect();

        let mut accepted = 0;
        let mut full = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(RegistryError::ActivityFull { .. }) => full += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(accepted, 5);
        assert_eq!(full, 45);
        let robotics = registry.get_activity("Robotics").await.unwrap();
        assert_eq!(robotics.participants.len(), 5);
    }

    #[tokio::test]
    async fn test_stats() {
        let registry = seeded_registry();
        registry
            .signup("Gym Class", "new@mergington.edu")
            .await
            .unwrap();
        let _ = registry.signup("Gym Class", "new@mergington.edu").await;

        let stats = registry.stats().await;
        assert_eq!(stats.activities, 3);
        assert_eq!(stats.total_participants, 7);
        assert_eq!(stats.total_capacity, 62);
        assert_eq!(stats.signups_accepted, 1);
        assert_eq!(stats.signups_rejected, 1);
    }

    #[test]
    fn test_from_provider_rejects_bad_catalog() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_seeds().returning(|| {
            vec![ActivitySeed::new("Art", "Painting", "Mondays", 1)
                .with_participants(["a@mergington.edu", "b@mergington.edu"])]
        });
        provider
            .expect_source_name()
            .returning(|| "mock".to_string());

        assert!(ActivityRegistry::from_provider(&provider, DOMAIN).is_err());
    }

    #[tokio::test]
    async fn test_from_provider_uses_seeds() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_seeds()
            .times(1)
            .returning(|| vec![ActivitySeed::new("Debate", "Argue well", "Fridays", 8)]);
        provider
            .expect_source_name()
            .returning(|| "mock".to_string());

        let registry = ActivityRegistry::from_provider(&provider, DOMAIN).unwrap();
        let activities = registry.list_activities().await;
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].name, "Debate");
    }
}
