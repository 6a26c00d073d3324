// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # System Resource Sampler
//!
//! Fills in [`SystemSnapshot`]'s hardware fields from `devops_bootstrap`'s
//! platform abstraction. Memory usage comes from `Platform::total_memory` /
//! `available_memory`; CPU load comes from `/proc/loadavg` on Unix,
//! normalized by core count, since `devops_bootstrap::platform::Platform`
//! does not yet expose point-in-time CPU utilization. Disk usage sampling
//! is not implemented — `Platform` has no filesystem-capacity query yet —
//! so `disk_percent` always reports 0.0 until that lands.

use devops_bootstrap::platform::Platform;

use super::observability::SystemSnapshot;

pub struct SystemSampler {
    platform: Box<dyn Platform>,
}

impl SystemSampler {
    pub fn new() -> Self {
        Self {
            platform: devops_bootstrap::platform::create_platform(),
        }
    }

    fn memory_percent(&self) -> f64 {
        let total = self.platform.total_memory().unwrap_or(1);
        let available = self.platform.available_memory().unwrap_or(total);
        if total == 0 {
            return 0.0;
        }
        let used = total.saturating_sub(available);
        (used as f64 / total as f64) * 100.0
    }

    #[cfg(target_os = "linux")]
    fn cpu_percent(&self) -> f64 {
        let Ok(contents) = std::fs::read_to_string("/proc/loadavg") else {
            return 0.0;
        };
        let one_minute_load: f64 = contents
            .split_whitespace()
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);
        let cores = self.platform.cpu_count().max(1) as f64;
        ((one_minute_load / cores) * 100.0).min(100.0)
    }

    #[cfg(not(target_os = "linux"))]
    fn cpu_percent(&self) -> f64 {
        0.0
    }

    /// Samples hardware fields only; callers fill in `cache_connected`,
    /// `aggregate_success_rate`, and `monitoring_active` from
    /// application-level state before deriving alerts.
    pub fn sample(&self) -> SystemSnapshot {
        SystemSnapshot {
            cpu_percent: self.cpu_percent(),
            memory_percent: self.memory_percent(),
            disk_percent: 0.0,
            cache_connected: false,
            aggregate_success_rate: 0.0,
            monitoring_active: false,
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}
