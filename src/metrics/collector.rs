//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the activity signup service
//! using Prometheus metrics.

use crate::registry::RegistryStats;
use crate::types::Activity;
use anyhow::Result;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the activity service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Signup and roster metrics
    activity_metrics: ActivityMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Handler latency by operation
    pub request_duration: HistogramVec,
}

/// Signup and roster metrics
#[derive(Clone)]
pub struct ActivityMetrics {
    /// Signup attempts by outcome
    pub signups_total: IntCounterVec,

    /// Current participants per activity
    pub participants: IntGaugeVec,

    /// Capacity per activity
    pub capacity: IntGaugeVec,

    /// Participants across the whole catalog
    pub total_participants: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let activity_metrics = ActivityMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            activity_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get activity metrics
    pub fn activity(&self) -> &ActivityMetrics {
        &self.activity_metrics
    }

    /// Record the outcome of one signup attempt
    pub fn record_signup(&self, outcome: &str, duration: Duration) {
        self.activity_metrics
            .signups_total
            .with_label_values(&[outcome])
            .inc();

        self.record_request("signup", duration);
    }

    /// Record handler latency
    pub fn record_request(&self, operation: &str, duration: Duration) {
        self.service_metrics
            .request_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Refresh the roster gauges from an activity snapshot
    pub fn update_from_activities(&self, activities: &[Activity]) {
        for activity in activities {
            self.activity_metrics
                .participants
                .with_label_values(&[activity.name.as_str()])
                .set(activity.participants.len() as i64);

            self.activity_metrics
                .capacity
                .with_label_values(&[activity.name.as_str()])
                .set(activity.max_participants as i64);
        }
    }

    /// Refresh catalog-wide gauges from registry stats
    pub fn update_from_registry_stats(&self, stats: &RegistryStats) {
        self.activity_metrics
            .total_participants
            .set(stats.total_participants as i64);
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("activities_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "activities_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "activities_request_duration_seconds",
                "Request handling duration",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
            &["operation"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            request_duration,
        })
    }
}

impl ActivityMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let signups_total = IntCounterVec::new(
            Opts::new("activities_signups_total", "Signup attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(signups_total.clone()))?;

        let participants = IntGaugeVec::new(
            Opts::new("activities_participants", "Current participants per activity"),
            &["activity"],
        )?;
        registry.register(Box::new(participants.clone()))?;

        let capacity = IntGaugeVec::new(
            Opts::new("activities_capacity", "Maximum participants per activity"),
            &["activity"],
        )?;
        registry.register(Box::new(capacity.clone()))?;

        let total_participants = IntGauge::new(
            "activities_total_participants",
            "Participants across all activities",
        )?;
        registry.register(Box::new(total_participants.clone()))?;

        Ok(Self {
            signups_total,
            participants,
            capacity,
            total_participants,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
