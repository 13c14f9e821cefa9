//! Main application state and service coordination
//!
//! `AppState` owns the activity registry and the metrics collector. It is
//! built once at startup and handed to the HTTP handlers through axum state,
//! so tests can build as many isolated instances as they like.

use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::registry::{ActivityRegistry, CatalogProvider, StaticCatalogProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Activity catalog and rosters
    registry: Arc<ActivityRegistry>,

    /// Metrics collector for monitoring
    metrics: Arc<MetricsCollector>,

    /// When the state was built
    started_at: Instant,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with the built-in activity catalog
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        Self::with_provider(config, &StaticCatalogProvider::new()).await
    }

    /// Initialize the application from a specific catalog provider
    pub async fn with_provider(
        config: AppConfig,
        provider: &dyn CatalogProvider,
    ) -> Result<Self, ServiceError> {
        info!("Initializing {} service", config.service.name);
        info!(
            "Configuration: required_email_domain={}, bind={}",
            config.registry.required_email_domain,
            config.bind_address()
        );

        let registry = ActivityRegistry::from_provider(
            provider,
            config.registry.required_email_domain.clone(),
        )
        .map_err(|e| ServiceError::Configuration {
            message: format!("Failed to load activity catalog: {:#}", e),
        })?;

        let metrics = MetricsCollector::new().map_err(|e| ServiceError::Initialization {
            message: format!("Failed to create metrics collector: {}", e),
        })?;

        let state = Self {
            config,
            registry: Arc::new(registry),
            metrics: Arc::new(metrics),
            started_at: Instant::now(),
            is_running: Arc::new(RwLock::new(false)),
        };
        state.refresh_metrics().await;

        info!("Activity registry ready with {} activities", state.registry.len());
        Ok(state)
    }

    /// Mark the service as accepting requests
    pub async fn start(&self) {
        *self.is_running.write().await = true;
        info!("✅ {} service started", self.config.service.name);
    }

    /// Mark the service as stopped and log final statistics
    pub async fn shutdown(&self) {
        *self.is_running.write().await = false;

        let final_stats = self.registry.stats().await;
        info!("Final service statistics: {:?}", final_stats);
        info!("✅ {} service shutdown completed", self.config.service.name);
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get the activity registry
    pub fn registry(&self) -> Arc<ActivityRegistry> {
        self.registry.clone()
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Time since the state was built
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Bring gauges in line with the registry
    pub async fn refresh_metrics(&self) {
        let activities = self.registry.list_activities().await;
        let stats = self.registry.stats().await;

        self.metrics.update_from_activities(&activities);
        self.metrics.update_from_registry_stats(&stats);
        self.metrics
            .service()
            .uptime_seconds
            .set(self.uptime().as_secs() as i64);

        debug!(
            "Updated metrics - activities: {}, participants: {}",
            stats.activities, stats.total_participants
        );
    }
}
