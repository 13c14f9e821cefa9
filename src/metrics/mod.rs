//! Metrics and monitoring for the activity signup service
//!
//! This module provides Prometheus metrics collection for signups and rosters.
//! The HTTP exposition lives in the web layer.

pub mod collector;

pub use collector::{ActivityMetrics, MetricsCollector, MetricsTimer, ServiceMetrics};
