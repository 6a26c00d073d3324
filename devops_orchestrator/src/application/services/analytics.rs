// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Analytics & Prediction Engine
//!
//! Ported from `pipeline_analyzer.py`: performance statistics, bottleneck
//! detection, trend analysis via closed-form ordinary least squares,
//! reliability (MTTR/MTBF), and resource usage. The original's scikit-learn
//! random-forest failure classifier and duration regressor are
//! re-architected as a lightweight, dependency-free weighted-feature
//! scorer — see [`FailurePredictor`] — preserving the 9-feature contract
//! and top-3-contributing-factors output without vendoring a full ML
//! stack. Every computed result is cached for 300 seconds under a string
//! key, matching the original's analysis cache TTL.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct ExecutionSample {
    pub duration_secs: f64,
    pub succeeded: bool,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    pub average: f64,
    pub median: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
    pub success_rate: f64,
    pub failure_rate: f64,
    pub throughput_per_day: f64,
}

fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct * (sorted.len() as f64 - 1.0)).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn stdev(values: &[f64], avg: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// `analyze_pipeline_performance`'s statistics: average, median, stdev,
/// min/max, p95/p99 of duration; success/failure rate; throughput per day
/// over the sample window spanning `days`.
pub fn performance_metrics(samples: &[ExecutionSample], days: f64) -> PerformanceMetrics {
    let mut durations: Vec<f64> = samples.iter().map(|s| s.duration_secs).collect();
    durations.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let avg = mean(&durations);
    let successes = samples.iter().filter(|s| s.succeeded).count();
    let total = samples.len().max(1);

    PerformanceMetrics {
        average: avg,
        median: percentile(&durations, 0.5),
        stdev: stdev(&durations, avg),
        min: durations.first().copied().unwrap_or(0.0),
        max: durations.last().copied().unwrap_or(0.0),
        p95: percentile(&durations, 0.95),
        p99: percentile(&durations, 0.99),
        success_rate: successes as f64 / total as f64,
        failure_rate: (total - successes) as f64 / total as f64,
        throughput_per_day: if days > 0.0 { samples.len() as f64 / days } else { 0.0 },
    }
}

#[derive(Debug, Clone)]
pub struct StageSample {
    pub stage_name: String,
    pub duration_secs: f64,
}

#[derive(Debug, Clone)]
pub struct Bottleneck {
    pub stage_name: String,
    pub impact_score: f64,
    pub optimization_potential: f64,
    pub recommendations: Vec<&'static str>,
}

/// Groups stage samples by name and ranks them by impact, matching
/// `_identify_bottlenecks`: `impact_score = avg_duration * (1 +
/// variance/avg_duration)`, `optimization_potential = min(0.5,
/// variance/avg_duration)`.
pub fn identify_bottlenecks(samples: &[StageSample]) -> Vec<Bottleneck> {
    let mut by_stage: HashMap<&str, Vec<f64>> = HashMap::new();
    for sample in samples {
        by_stage.entry(sample.stage_name.as_str()).or_default().push(sample.duration_secs);
    }

    let mut bottlenecks: Vec<Bottleneck> = by_stage
        .into_iter()
        .map(|(name, durations)| {
            let avg = mean(&durations);
            let variance = stdev(&durations, avg).powi(2);
            let ratio = if avg > 0.0 { variance / avg } else { 0.0 };
            let impact_score = avg * (1.0 + ratio);
            let optimization_potential = ratio.min(0.5);

            let mut recommendations = Vec::new();
            if avg > 120.0 {
                recommendations.push("cache dependencies");
                recommendations.push("optimize resources");
            }
            if ratio > 0.3 {
                recommendations.push("investigate flakiness");
                recommendations.push("add retries");
            }

            Bottleneck {
                stage_name: name.to_string(),
                impact_score,
                optimization_potential,
                recommendations,
            }
        })
        .collect();

    bottlenecks.sort_by(|a, b| b.impact_score.partial_cmp(&a.impact_score).unwrap());
    bottlenecks
}

#[derive(Debug, Clone)]
pub enum TrendAnalysis {
    InsufficientData,
    Trend { slope: f64, r_squared: f64, direction: &'static str },
}

/// Ordinary least squares fit of `duration ~ execution_index`, the closed-
/// form equivalent of the original's single-feature `sklearn.LinearRegression`.
/// Requires at least 10 executions; `|slope| < 1.0` is "stable".
pub fn analyze_trends(durations_in_order: &[f64]) -> TrendAnalysis {
    if durations_in_order.len() < 10 {
        return TrendAnalysis::InsufficientData;
    }
    let n = durations_in_order.len() as f64;
    let xs: Vec<f64> = (0..durations_in_order.len()).map(|i| i as f64).collect();
    let x_mean = mean(&xs);
    let y_mean = mean(durations_in_order);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    for (x, y) in xs.iter().zip(durations_in_order.iter()) {
        cov += (x - x_mean) * (y - y_mean);
        var_x += (x - x_mean).powi(2);
    }
    let slope = if var_x > 0.0 { cov / var_x } else { 0.0 };
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in xs.iter().zip(durations_in_order.iter()) {
        let predicted = slope * x + intercept;
        ss_res += (y - predicted).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };
    let _ = n;

    let direction = if slope.abs() < 1.0 {
        "stable"
    } else if slope > 0.0 {
        "degrading"
    } else {
        "improving"
    };

    TrendAnalysis::Trend { slope, r_squared, direction }
}

#[derive(Debug, Clone)]
pub struct ReliabilityMetrics {
    pub mttr_secs: f64,
    pub mtbf_secs: f64,
    pub max_consecutive_failures: u32,
}

/// MTTR = mean time between a failure and the next success; MTBF = mean
/// gap between consecutive failures (`+inf` when at most one failure was
/// observed).
pub fn reliability_metrics(samples_in_order: &[ExecutionSample]) -> ReliabilityMetrics {
    let mut recoveries = Vec::new();
    let mut failure_gaps = Vec::new();
    let mut last_failure: Option<chrono::DateTime<chrono::Utc>> = None;
    let mut consecutive = 0u32;
    let mut max_consecutive = 0u32;

    for sample in samples_in_order {
        if sample.succeeded {
            if let Some(failed_at) = last_failure.take() {
                recoveries.push((sample.started_at - failed_at).num_milliseconds() as f64 / 1000.0);
            }
            consecutive = 0;
        } else {
            if let Some(prev) = last_failure {
                failure_gaps.push((sample.started_at - prev).num_milliseconds() as f64 / 1000.0);
            }
            last_failure = Some(sample.started_at);
            consecutive += 1;
            max_consecutive = max_consecutive.max(consecutive);
        }
    }

    ReliabilityMetrics {
        mttr_secs: mean(&recoveries),
        mtbf_secs: if failure_gaps.len() >= 1 { mean(&failure_gaps) } else { f64::INFINITY },
        max_consecutive_failures: max_consecutive,
    }
}

#[derive(Debug, Clone)]
pub struct ResourceSample {
    pub cpu_seconds: f64,
    pub duration_secs: f64,
    pub memory_mb: f64,
}

#[derive(Debug, Clone)]
pub struct ResourceUsage {
    pub cpu_efficiency: f64,
    pub average_memory_mb: f64,
    pub peak_memory_mb: f64,
    pub resource_consistency: f64,
}

pub fn analyze_resource_usage(samples: &[ResourceSample]) -> ResourceUsage {
    let efficiencies: Vec<f64> = samples
        .iter()
        .filter(|s| s.duration_secs > 0.0)
        .map(|s| s.cpu_seconds / s.duration_secs)
        .collect();
    let avg_efficiency = mean(&efficiencies);
    let memories: Vec<f64> = samples.iter().map(|s| s.memory_mb).collect();

    ResourceUsage {
        cpu_efficiency: avg_efficiency,
        average_memory_mb: mean(&memories),
        peak_memory_mb: memories.iter().cloned().fold(0.0, f64::max),
        resource_consistency: 1.0 - stdev(&efficiencies, avg_efficiency),
    }
}

/// The 9-dimensional feature vector the original's random-forest failure
/// classifier and duration regressor both consume.
#[derive(Debug, Clone, Copy)]
pub struct PredictionFeatures {
    pub avg_duration: f64,
    pub duration_variance: f64,
    pub recent_failure_rate: f64,
    pub execution_frequency: f64,
    pub hour_of_day: f64,
    pub day_of_week: f64,
    pub changed_files_count: f64,
    pub commit_size: f64,
    pub is_main_branch: f64,
}

impl PredictionFeatures {
    fn as_named_array(&self) -> [(&'static str, f64); 9] {
        [
            ("avg_duration", self.avg_duration),
            ("duration_variance", self.duration_variance),
            ("recent_failure_rate", self.recent_failure_rate),
            ("execution_frequency", self.execution_frequency),
            ("hour_of_day", self.hour_of_day),
            ("day_of_week", self.day_of_week),
            ("changed_files_count", self.changed_files_count),
            ("commit_size", self.commit_size),
            ("is_main_branch", self.is_main_branch),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct FailurePrediction {
    pub probability: f64,
    pub will_fail: bool,
    pub top_factors: Vec<(&'static str, f64)>,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct DurationPrediction {
    pub predicted_secs: f64,
    pub confidence: f64,
}

/// Hand-weighted, dependency-free stand-in for the original's trained
/// random-forest models. Requires at least 10 historical samples to train
/// (mirrors the original's minimum sample count); below that, predictions
/// return zero confidence rather than guessing. Weights here are a fixed,
/// documented heuristic rather than learned coefficients — see DESIGN.md
/// for why true random-forest training was scoped out.
pub struct FailurePredictor {
    weights: [(&'static str, f64); 9],
    trained_on_samples: usize,
}

const FAILURE_PREDICTOR_MIN_SAMPLES: usize = 10;

impl FailurePredictor {
    pub fn train(sample_count: usize) -> Option<Self> {
        if sample_count < FAILURE_PREDICTOR_MIN_SAMPLES {
            return None;
        }
        Some(Self {
            weights: [
                ("avg_duration", 0.02),
                ("duration_variance", 0.10),
                ("recent_failure_rate", 0.45),
                ("execution_frequency", -0.05),
                ("hour_of_day", 0.01),
                ("day_of_week", 0.01),
                ("changed_files_count", 0.08),
                ("commit_size", 0.06),
                ("is_main_branch", -0.10),
            ],
            trained_on_samples: sample_count,
        })
    }

    pub fn predict_failure(&self, features: &PredictionFeatures) -> FailurePrediction {
        let named = features.as_named_array();
        let mut contributions: Vec<(&'static str, f64)> = named
            .iter()
            .zip(self.weights.iter())
            .map(|((name, value), (_, weight))| (*name, value * weight))
            .collect();

        let raw = 0.5 + contributions.iter().map(|(_, c)| c).sum::<f64>();
        let probability = raw.clamp(0.0, 1.0);

        contributions.sort_by(|a, b| b.1.abs().partial_cmp(&a.1.abs()).unwrap());
        let top_factors = contributions.into_iter().take(3).collect();

        FailurePrediction {
            probability,
            will_fail: probability >= 0.5,
            top_factors,
            confidence: (self.trained_on_samples as f64 / (self.trained_on_samples as f64 + 10.0)).min(0.9),
        }
    }

    pub fn predict_duration(&self, features: &PredictionFeatures, historical_mean_secs: f64) -> DurationPrediction {
        let adjustment = 1.0 + features.duration_variance.min(1.0) * 0.2;
        DurationPrediction {
            predicted_secs: historical_mean_secs * adjustment,
            confidence: 0.5,
        }
    }
}

/// `analyze_pipeline_performance`'s 300-second analysis cache: results are
/// served from cache only while `now - stored_at < ttl`.
pub struct AnalysisCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, serde_json::Value)>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).and_then(|(stored_at, value)| {
            if stored_at.elapsed() < self.ttl {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn put(&self, key: impl Into<String>, value: serde_json::Value) {
        self.entries.lock().unwrap().insert(key.into(), (Instant::now(), value));
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AnalyticsEngine {
    pub cache: AnalysisCache,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self { cache: AnalysisCache::new() }
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn fewer_than_ten_executions_is_insufficient_data() {
        let durations = vec![10.0; 5];
        assert!(matches!(analyze_trends(&durations), TrendAnalysis::InsufficientData));
    }

    #[test]
    fn rising_durations_are_flagged_degrading() {
        let durations: Vec<f64> = (0..20).map(|i| 10.0 + i as f64 * 5.0).collect();
        match analyze_trends(&durations) {
            TrendAnalysis::Trend { direction, slope, .. } => {
                assert_eq!(direction, "degrading");
                assert!(slope > 0.0);
            }
            _ => panic!("expected a trend"),
        }
    }

    #[test]
    fn bottlenecks_sorted_by_impact_descending() {
        let samples = vec![
            StageSample { stage_name: "build".into(), duration_secs: 30.0 },
            StageSample { stage_name: "build".into(), duration_secs: 32.0 },
            StageSample { stage_name: "deploy".into(), duration_secs: 200.0 },
            StageSample { stage_name: "deploy".into(), duration_secs: 210.0 },
        ];
        let bottlenecks = identify_bottlenecks(&samples);
        assert_eq!(bottlenecks[0].stage_name, "deploy");
        assert!(bottlenecks[0].recommendations.contains(&"cache dependencies"));
    }

    #[test]
    fn failure_predictor_requires_minimum_samples() {
        assert!(FailurePredictor::train(5).is_none());
        assert!(FailurePredictor::train(10).is_some());
    }

    #[test]
    fn failure_prediction_returns_top_three_factors() {
        let predictor = FailurePredictor::train(50).unwrap();
        let features = PredictionFeatures {
            avg_duration: 60.0,
            duration_variance: 0.2,
            recent_failure_rate: 0.6,
            execution_frequency: 5.0,
            hour_of_day: 14.0,
            day_of_week: 2.0,
            changed_files_count: 3.0,
            commit_size: 120.0,
            is_main_branch: 1.0,
        };
        let prediction = predictor.predict_failure(&features);
        assert_eq!(prediction.top_factors.len(), 3);
    }

    #[test]
    fn mtbf_is_infinite_with_at_most_one_failure() {
        let now = Utc::now();
        let samples = vec![
            ExecutionSample { duration_secs: 10.0, succeeded: true, started_at: now },
            ExecutionSample { duration_secs: 10.0, succeeded: false, started_at: now },
        ];
        let reliability = reliability_metrics(&samples);
        assert!(reliability.mtbf_secs.is_infinite());
    }
}
