// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! The end-to-end UAT workflow and its results

pub mod orchestrator;
pub mod results;

pub use orchestrator::{ProgressEvent, Workflow, WorkflowSettings};
pub use results::{
    DebugInfo, ExchangeReport, IssueJwtReport, KeyGenReport, RegisterConfigReport, StepOutcome,
    TokenReport, WorkflowResults, WorkflowStep,
};
