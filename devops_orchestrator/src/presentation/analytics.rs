// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Analytics Route
//!
//! `GET /api/analytics/{pipeline_id}` turns a registered pipeline's recent
//! execution history into the [`crate::application::services::analytics`]
//! suite's performance, bottleneck, trend, reliability, and
//! failure-prediction output, cached under [`AnalyticsEngine`]'s 300-second
//! window.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Datelike, Timelike};
use serde::Deserialize;
use serde_json::json;

use devops_domain::error::DevOpsError;
use devops_domain::value_objects::{PipelineId, WorkflowStatus};

use crate::application::services::analytics::{
    analyze_trends, identify_bottlenecks, performance_metrics, reliability_metrics, ExecutionSample, FailurePredictor, PredictionFeatures,
    StageSample, TrendAnalysis,
};
use crate::presentation::error::ApiResult;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default = "default_days")]
    pub days: f64,
}

fn default_days() -> f64 {
    30.0
}

/// History depth pulled per request; matches the bottleneck/trend formulas'
/// appetite for a few hundred executions without unbounded table scans.
const HISTORY_LIMIT: usize = 200;

pub async fn get_pipeline_analytics(
    State(state): State<AppState>,
    Path(pipeline_id): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let pipeline_id = PipelineId::from_stored(pipeline_id);
    let entry = state
        .pipeline_manager
        .registry()
        .get(&pipeline_id)
        .await?
        .ok_or_else(|| DevOpsError::not_found(format!("no registered pipeline '{pipeline_id}'")))?;

    let cache_key = format!("analytics:{}:{}", pipeline_id, query.days as u64);
    if let Some(cached) = state.analytics.cache.get(&cache_key) {
        return Ok(Json(cached));
    }

    let mut executions = state.workflow_orchestrator.executions().list_recent(&entry.workflow_name, HISTORY_LIMIT).await?;
    executions.sort_by_key(|e| e.started_at);

    let samples: Vec<ExecutionSample> = executions
        .iter()
        .map(|e| ExecutionSample {
            duration_secs: e.finished_at.map(|f| (f - e.started_at).num_milliseconds() as f64 / 1000.0).unwrap_or(0.0),
            succeeded: matches!(e.status, WorkflowStatus::Success),
            started_at: e.started_at,
        })
        .collect();

    let stage_samples: Vec<StageSample> = executions
        .iter()
        .flat_map(|e| e.stage_results.iter())
        .filter_map(|r| {
            r.finished_at.map(|f| StageSample {
                stage_name: r.stage_name.clone(),
                duration_secs: (f - r.started_at).num_milliseconds() as f64 / 1000.0,
            })
        })
        .collect();

    let metrics = performance_metrics(&samples, query.days.max(1.0));
    let bottlenecks = identify_bottlenecks(&stage_samples);
    let durations: Vec<f64> = samples.iter().map(|s| s.duration_secs).collect();
    let trend = analyze_trends(&durations);
    let reliability = reliability_metrics(&samples);

    let prediction = FailurePredictor::train(samples.len()).map(|predictor| {
        let now = chrono::Utc::now();
        let features = PredictionFeatures {
            avg_duration: metrics.average,
            duration_variance: metrics.stdev.powi(2),
            recent_failure_rate: metrics.failure_rate,
            execution_frequency: metrics.throughput_per_day,
            hour_of_day: now.hour() as f64,
            day_of_week: now.weekday().num_days_from_monday() as f64,
            changed_files_count: 0.0,
            commit_size: 0.0,
            is_main_branch: 1.0,
        };
        predictor.predict_failure(&features)
    });

    let body = json!({
        "pipeline_id": pipeline_id.as_str(),
        "repository": entry.repository,
        "sample_count": samples.len(),
        "performance": {
            "average": metrics.average,
            "median": metrics.median,
            "stdev": metrics.stdev,
            "min": metrics.min,
            "max": metrics.max,
            "p95": metrics.p95,
            "p99": metrics.p99,
            "success_rate": metrics.success_rate,
            "failure_rate": metrics.failure_rate,
            "throughput_per_day": metrics.throughput_per_day,
        },
        "bottlenecks": bottlenecks.iter().map(|b| json!({
            "stage_name": b.stage_name,
            "impact_score": b.impact_score,
            "optimization_potential": b.optimization_potential,
            "recommendations": b.recommendations,
        })).collect::<Vec<_>>(),
        "trend": match trend {
            TrendAnalysis::InsufficientData => json!({ "status": "insufficient_data" }),
            TrendAnalysis::Trend { slope, r_squared, direction } => json!({
                "status": "ok",
                "slope": slope,
                "r_squared": r_squared,
                "direction": direction,
            }),
        },
        "reliability": {
            "mttr_secs": reliability.mttr_secs,
            "mtbf_secs": if reliability.mtbf_secs.is_finite() { json!(reliability.mtbf_secs) } else { json!(null) },
            "max_consecutive_failures": reliability.max_consecutive_failures,
        },
        "failure_prediction": prediction.map(|p| json!({
            "probability": p.probability,
            "will_fail": p.will_fail,
            "top_factors": p.top_factors,
            "confidence": p.confidence,
        })),
    });

    state.analytics.cache.put(cache_key, body.clone());
    Ok(Json(body))
}
