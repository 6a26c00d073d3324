// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DevOps Metric Entity
//!
//! A single timestamped measurement recorded against a pipeline, workflow, or
//! platform (duration, success flag, queue time, and so on). The analytics
//! engine reads sequences of these to compute performance statistics,
//! bottlenecks, trends, and reliability figures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{PipelineId, PlatformType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevOpsMetric {
    pub pipeline_id: PipelineId,
    pub platform: PlatformType,
    pub metric_name: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

impl DevOpsMetric {
    pub fn new(pipeline_id: PipelineId, platform: PlatformType, metric_name: impl Into<String>, value: f64) -> Self {
        Self {
            pipeline_id,
            platform,
            metric_name: metric_name.into(),
            value,
            recorded_at: Utc::now(),
        }
    }
}

/// A registered CI/CD pipeline and its rolling health statistics.
///
/// Ported from `PipelineRegistryEntry`: `success_rate` and `avg_duration_secs`
/// are exponential moving averages with smoothing factor `alpha = 0.1`,
/// updated on every completed run via [`PipelineRegistryEntry::record_run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRegistryEntry {
    pub pipeline_id: PipelineId,
    pub platform: PlatformType,
    pub repository: String,
    pub workflow_name: String,
    pub success_rate: f64,
    pub avg_duration_secs: f64,
    pub total_runs: u64,
    pub last_run_at: Option<DateTime<Utc>>,
}

const EMA_ALPHA: f64 = 0.1;

impl PipelineRegistryEntry {
    pub fn new(pipeline_id: PipelineId, platform: PlatformType, repository: String, workflow_name: String) -> Self {
        Self {
            pipeline_id,
            platform,
            repository,
            workflow_name,
            success_rate: 1.0,
            avg_duration_secs: 0.0,
            total_runs: 0,
            last_run_at: None,
        }
    }

    /// Folds a completed run's outcome into the rolling statistics using an
    /// exponential moving average with `alpha = 0.1`: each new observation
    /// moves the average 10% of the way toward it, so recent runs dominate
    /// without single-run spikes causing large swings.
    pub fn record_run(&mut self, succeeded: bool, duration_secs: f64, finished_at: DateTime<Utc>) {
        let outcome = if succeeded { 1.0 } else { 0.0 };
        if self.total_runs == 0 {
            self.success_rate = outcome;
            self.avg_duration_secs = duration_secs;
        } else {
            self.success_rate = EMA_ALPHA * outcome + (1.0 - EMA_ALPHA) * self.success_rate;
            self.avg_duration_secs = EMA_ALPHA * duration_secs + (1.0 - EMA_ALPHA) * self.avg_duration_secs;
        }
        self.total_runs += 1;
        self.last_run_at = Some(finished_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> PipelineRegistryEntry {
        PipelineRegistryEntry::new(
            PipelineId::compose(PlatformType::GithubActions, &"org/repo".parse_repo(), 42),
            PlatformType::GithubActions,
            "org/repo".into(),
            "ci".into(),
        )
    }

    trait ParseRepo {
        fn parse_repo(&self) -> crate::value_objects::RepositoryRef;
    }
    impl ParseRepo for &str {
        fn parse_repo(&self) -> crate::value_objects::RepositoryRef {
            crate::value_objects::RepositoryRef::new(*self).unwrap()
        }
    }

    #[test]
    fn first_run_sets_baseline() {
        let mut e = entry();
        e.record_run(true, 120.0, Utc::now());
        assert_eq!(e.total_runs, 1);
        assert_eq!(e.success_rate, 1.0);
        assert_eq!(e.avg_duration_secs, 120.0);
    }

    #[test]
    fn ema_moves_toward_new_observation() {
        let mut e = entry();
        e.record_run(true, 100.0, Utc::now());
        e.record_run(false, 300.0, Utc::now());
        assert!((e.success_rate - 0.9).abs() < 1e-9);
        assert!((e.avg_duration_secs - 120.0).abs() < 1e-9);
    }
}
