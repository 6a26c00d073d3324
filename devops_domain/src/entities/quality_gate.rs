// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Quality Gate Entities
//!
//! A quality gate is a named threshold check (coverage, lint violations,
//! security findings) evaluated against a workflow execution before it is
//! allowed to proceed to the next stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::QualityGateExecutionId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    GreaterOrEqual,
    LessOrEqual,
    Equal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityGate {
    pub name: String,
    pub metric_name: String,
    pub threshold: f64,
    pub comparator: Comparator,
}

impl QualityGate {
    pub fn evaluate(&self, observed: f64) -> bool {
        match self.comparator {
            Comparator::GreaterOrEqual => observed >= self.threshold,
            Comparator::LessOrEqual => observed <= self.threshold,
            Comparator::Equal => (observed - self.threshold).abs() < f64::EPSILON,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityGateExecution {
    pub id: QualityGateExecutionId,
    pub gate_name: String,
    pub observed_value: f64,
    pub passed: bool,
    pub evaluated_at: DateTime<Utc>,
}

impl QualityGateExecution {
    pub fn evaluate(gate: &QualityGate, observed_value: f64) -> Self {
        Self {
            id: QualityGateExecutionId::new(),
            gate_name: gate.name.clone(),
            observed_value,
            passed: gate.evaluate(observed_value),
            evaluated_at: Utc::now(),
        }
    }
}
