// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Typed results accumulated by a workflow run
//!
//! One optional field per step. A field stays `None` until its step ran, so a
//! halted run still shows exactly how far it got.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::keygen::KeyPaths;
use crate::error::UatError;

/// Steps of the workflow state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Idle,
    KeyGen,
    PatLogin,
    RegisterConfig,
    IssueJwt,
    ExchangeTcm,
    ExchangeContent,
    Done,
    Failed,
}

impl WorkflowStep {
    /// Step that follows a successful `self`, `None` once terminal
    pub fn next(self) -> Option<WorkflowStep> {
        use WorkflowStep::*;
        match self {
            Idle => Some(KeyGen),
            KeyGen => Some(PatLogin),
            PatLogin => Some(RegisterConfig),
            RegisterConfig => Some(IssueJwt),
            IssueJwt => Some(ExchangeTcm),
            ExchangeTcm => Some(ExchangeContent),
            ExchangeContent => Some(Done),
            Done | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowStep::Done | WorkflowStep::Failed)
    }

    /// Position shown to the operator ("Step 3")
    pub fn number(self) -> Option<u8> {
        use WorkflowStep::*;
        match self {
            KeyGen => Some(1),
            PatLogin => Some(2),
            RegisterConfig => Some(3),
            IssueJwt => Some(4),
            ExchangeTcm => Some(5),
            ExchangeContent => Some(6),
            Idle | Done | Failed => None,
        }
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowStep::Idle => "Idle",
            WorkflowStep::KeyGen => "KeyGen",
            WorkflowStep::PatLogin => "PatLogin",
            WorkflowStep::RegisterConfig => "RegisterConfig",
            WorkflowStep::IssueJwt => "IssueJwt",
            WorkflowStep::ExchangeTcm => "ExchangeTcm",
            WorkflowStep::ExchangeContent => "ExchangeContent",
            WorkflowStep::Done => "Done",
            WorkflowStep::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome<T> {
    Success(T),
    Failed { error: String, detail: Option<T> },
    Skipped { reason: String },
}

impl<T> StepOutcome<T> {
    pub fn failed(error: &UatError) -> Self {
        StepOutcome::Failed {
            error: error.to_string(),
            detail: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped { .. })
    }

    /// Report of the step, if it produced one
    pub fn report(&self) -> Option<&T> {
        match self {
            StepOutcome::Success(report) => Some(report),
            StepOutcome::Failed { detail, .. } => detail.as_ref(),
            StepOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyGenReport {
    pub bits: usize,
    #[serde(flatten)]
    pub paths: KeyPaths,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenReport {
    /// Truncated session token
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterConfigReport {
    pub name: String,
    pub config_id: Option<String>,
    pub resource_ids: Vec<String>,
    pub scopes: Vec<String>,
    pub http_status: u16,
    pub message: Option<String>,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueJwtReport {
    /// Full signed token, reused by the connection tests
    pub token: String,
    pub expiration_minutes: i64,
    pub scopes: Vec<String>,
}

/// Diagnostics attached to the content sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub decoded_payload: Value,
    /// Body sent, with the JWT cut to 50 characters
    pub request_body_sent: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeReport {
    /// Truncated session token
    pub token: String,
    /// Exact `curl` reproduction of the request
    pub curl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

/// Cumulative results of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_gen: Option<StepOutcome<KeyGenReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pat_login: Option<StepOutcome<TokenReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_config: Option<StepOutcome<RegisterConfigReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_jwt: Option<StepOutcome<IssueJwtReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_tcm: Option<StepOutcome<ExchangeReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_content: Option<StepOutcome<ExchangeReport>>,
}

impl WorkflowResults {
    /// Record a failure for `step` unless the step already reported one
    pub fn record_failure(&mut self, step: WorkflowStep, error: &UatError) {
        fn set<T>(slot: &mut Option<StepOutcome<T>>, error: &UatError) {
            if slot.is_none() {
                *slot = Some(StepOutcome::failed(error));
            }
        }
        match step {
            WorkflowStep::KeyGen => set(&mut self.key_gen, error),
            WorkflowStep::PatLogin => set(&mut self.pat_login, error),
            WorkflowStep::RegisterConfig => set(&mut self.register_config, error),
            WorkflowStep::IssueJwt => set(&mut self.issue_jwt, error),
            WorkflowStep::ExchangeTcm => set(&mut self.exchange_tcm, error),
            WorkflowStep::ExchangeContent => set(&mut self.exchange_content, error),
            WorkflowStep::Idle | WorkflowStep::Done | WorkflowStep::Failed => {}
        }
    }

    /// The signed JWT, if step 4 succeeded
    pub fn jwt(&self) -> Option<&str> {
        match &self.issue_jwt {
            Some(StepOutcome::Success(report)) => Some(&report.token),
            _ => None,
        }
    }

    /// Resource ids sent with the UAT configuration
    pub fn resource_ids(&self) -> Option<&[String]> {
        self.register_config
            .as_ref()
            .and_then(StepOutcome::report)
            .map(|report| report.resource_ids.as_slice())
    }

    pub fn config_id(&self) -> Option<&str> {
        self.register_config
            .as_ref()
            .and_then(StepOutcome::report)
            .and_then(|report| report.config_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_sequence() {
        let mut step = WorkflowStep::Idle;
        let mut visited = Vec::new();
        while let Some(next) = step.next() {
            visited.push(next);
            step = next;
        }
        assert_eq!(visited.len(), 7);
        assert_eq!(step, WorkflowStep::Done);
        assert!(WorkflowStep::Failed.next().is_none());
        assert_eq!(WorkflowStep::RegisterConfig.number(), Some(3));
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let skipped: StepOutcome<ExchangeReport> = StepOutcome::Skipped {
            reason: "No sites configured".to_string(),
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["status"], "skipped");

        let success = StepOutcome::Success(TokenReport {
            token: "abc...".to_string(),
        });
        let json = serde_json::to_value(&success).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["token"], "abc...");
    }

    #[test]
    fn test_record_failure_keeps_existing_detail() {
        let mut results = WorkflowResults::default();
        results.register_config = Some(StepOutcome::Failed {
            error: "HTTP 409".to_string(),
            detail: None,
        });
        results.record_failure(
            WorkflowStep::RegisterConfig,
            &UatError::validation("other"),
        );
        assert!(matches!(
            &results.register_config,
            Some(StepOutcome::Failed { error, .. }) if error == "HTTP 409"
        ));

        results.record_failure(WorkflowStep::KeyGen, &UatError::validation("disk"));
        assert!(results.key_gen.as_ref().unwrap().is_failed());
        assert!(results.jwt().is_none());
    }
}
