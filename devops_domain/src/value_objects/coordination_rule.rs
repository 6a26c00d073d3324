// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cross-Platform Coordination Rule
//!
//! Condition/action pairs evaluated by the cross-platform coordinator once a
//! resource reservation succeeds. Conditions and actions are free-form JSON
//! so operators can add new rule types without a schema migration; unknown
//! condition types default to matching (the rule fires), unknown action
//! types are a silent no-op, and a condition that fails to parse its
//! expected fields does not match. This mirrors
//! `PipelineCoordinationRule._evaluate_condition` /
//! `_execute_rule_action` in the orchestrator this was distilled from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::platform::PlatformType;
use super::repository_ref::RepositoryRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationRule {
    pub name: String,
    pub enabled: bool,
    /// JSON condition, e.g. `{"type": "platform_count", "min_platforms": 2}`
    /// or `{"type": "repository_match", "repository": "org/repo"}`.
    pub condition: Value,
    /// JSON action, e.g. `{"type": "delay", "seconds": 5}` or
    /// `{"type": "log", "message": "..."}`.
    pub action: Value,
}

impl CoordinationRule {
    /// Evaluates this rule's condition against the platforms and repository
    /// involved in an in-flight cross-platform operation.
    ///
    /// An unrecognized `type` defaults to `true` (the rule fires); a
    /// condition whose declared fields are missing or malformed evaluates to
    /// `false` rather than erroring, matching the original's best-effort
    /// parsing.
    pub fn condition_matches(&self, platforms: &[PlatformType], repository: &RepositoryRef) -> bool {
        let Some(kind) = self.condition.get("type").and_then(Value::as_str) else {
            return false;
        };
        match kind {
            "platform_count" => {
                let Some(min_platforms) = self.condition.get("min_platforms").and_then(Value::as_u64) else {
                    return false;
                };
                platforms.len() as u64 >= min_platforms
            }
            "repository_match" => {
                let Some(expected) = self.condition.get("repository").and_then(Value::as_str) else {
                    return false;
                };
                expected == repository.as_str()
            }
            _ => true,
        }
    }

    /// Describes this rule's action without executing it; the coordinator
    /// interprets the returned description (delay vs. log vs. no-op).
    pub fn action_kind(&self) -> RuleAction {
        match self.action.get("type").and_then(Value::as_str) {
            Some("delay") => {
                let seconds = self.action.get("seconds").and_then(Value::as_u64).unwrap_or(0);
                RuleAction::Delay(seconds)
            }
            Some("log") => {
                let message = self
                    .action
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("coordination rule fired")
                    .to_string();
                RuleAction::Log(message)
            }
            _ => RuleAction::NoOp,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RuleAction {
    Delay(u64),
    Log(String),
    NoOp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo() -> RepositoryRef {
        RepositoryRef::new("org/repo").unwrap()
    }

    #[test]
    fn unknown_condition_type_defaults_true() {
        let rule = CoordinationRule {
            name: "r".into(),
            enabled: true,
            condition: json!({"type": "something_new"}),
            action: json!({"type": "log", "message": "hi"}),
        };
        assert!(rule.condition_matches(&[PlatformType::GithubActions], &repo()));
    }

    #[test]
    fn malformed_platform_count_condition_does_not_match() {
        let rule = CoordinationRule {
            name: "r".into(),
            enabled: true,
            condition: json!({"type": "platform_count"}),
            action: json!({"type": "noop"}),
        };
        assert!(!rule.condition_matches(&[PlatformType::GithubActions], &repo()));
    }

    #[test]
    fn unknown_action_is_noop() {
        let rule = CoordinationRule {
            name: "r".into(),
            enabled: true,
            condition: json!({"type": "platform_count", "min_platforms": 1}),
            action: json!({"type": "do_a_barrel_roll"}),
        };
        assert_eq!(rule.action_kind(), RuleAction::NoOp);
    }
}
