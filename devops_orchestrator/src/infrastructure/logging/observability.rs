// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Observability Service
//!
//! Derives a weighted system health score and a list of active alerts from
//! the latest system metrics snapshot and pipeline registry statistics.
//! Alert thresholds (CPU > 80%, memory > 85%, disk > 90%, cache
//! disconnected, aggregate success rate < 0.8, monitoring inactive) and the
//! health-score weighting (performance 30%, reliability 25%, resource 25%,
//! dependency 20%) are read directly off the dashboard surface this service
//! backs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub score: f64,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub cache_connected: bool,
    pub aggregate_success_rate: f64,
    pub monitoring_active: bool,
}

pub struct ObservabilityService;

const WEIGHT_PERFORMANCE: f64 = 0.30;
const WEIGHT_RELIABILITY: f64 = 0.25;
const WEIGHT_RESOURCE: f64 = 0.25;
const WEIGHT_DEPENDENCY: f64 = 0.20;

impl ObservabilityService {
    /// Derives alerts from the fixed thresholds the dashboard surface
    /// publishes: CPU > 80, memory > 85, disk > 90, cache disconnected,
    /// aggregate success rate < 0.8, and monitoring inactive.
    pub fn derive_alerts(snapshot: &SystemSnapshot) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if snapshot.cpu_percent > 80.0 {
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: format!("CPU usage at {:.1}%", snapshot.cpu_percent),
            });
        }
        if snapshot.memory_percent > 85.0 {
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: format!("Memory usage at {:.1}%", snapshot.memory_percent),
            });
        }
        if snapshot.disk_percent > 90.0 {
            alerts.push(Alert {
                severity: AlertSeverity::Critical,
                message: format!("Disk usage at {:.1}%", snapshot.disk_percent),
            });
        }
        if !snapshot.cache_connected {
            alerts.push(Alert {
                severity: AlertSeverity::Critical,
                message: "cache store is disconnected".to_string(),
            });
        }
        if snapshot.aggregate_success_rate < 0.8 {
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: format!(
                    "aggregate pipeline success rate at {:.1}%",
                    snapshot.aggregate_success_rate * 100.0
                ),
            });
        }
        if !snapshot.monitoring_active {
            alerts.push(Alert {
                severity: AlertSeverity::Critical,
                message: "repository monitoring is not running".to_string(),
            });
        }
        alerts
    }

    /// Weighted health score in `[0.0, 1.0]`: 30% performance (inverse of
    /// CPU load), 25% reliability (aggregate success rate), 25% resource
    /// headroom (inverse of memory+disk load), 20% dependency health (cache
    /// connectivity).
    pub fn health_score(snapshot: &SystemSnapshot) -> SystemHealth {
        let performance = 1.0 - (snapshot.cpu_percent / 100.0).clamp(0.0, 1.0);
        let reliability = snapshot.aggregate_success_rate.clamp(0.0, 1.0);
        let resource = 1.0 - ((snapshot.memory_percent + snapshot.disk_percent) / 200.0).clamp(0.0, 1.0);
        let dependency = if snapshot.cache_connected { 1.0 } else { 0.0 };

        let score = WEIGHT_PERFORMANCE * performance
            + WEIGHT_RELIABILITY * reliability
            + WEIGHT_RESOURCE * resource
            + WEIGHT_DEPENDENCY * dependency;

        SystemHealth {
            score,
            alerts: Self::derive_alerts(snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_snapshot_has_no_alerts() {
        let snap = SystemSnapshot {
            cpu_percent: 10.0,
            memory_percent: 20.0,
            disk_percent: 30.0,
            cache_connected: true,
            aggregate_success_rate: 0.95,
            monitoring_active: true,
        };
        assert!(ObservabilityService::derive_alerts(&snap).is_empty());
        assert!(ObservabilityService::health_score(&snap).score > 0.9);
    }

    #[test]
    fn disconnected_cache_raises_critical_alert() {
        let snap = SystemSnapshot {
            cache_connected: false,
            ..Default::default()
        };
        let alerts = ObservabilityService::derive_alerts(&snap);
        assert!(alerts.iter().any(|a| a.severity == AlertSeverity::Critical));
    }
}
