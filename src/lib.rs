// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust UAT configuration library
//!
//! Issues short-lived, scope-restricted Unified Access Tokens (UAT) for
//! Tableau Cloud Manager and Tableau Cloud, and manages the UAT
//! configurations that make those tokens valid.
//!
//! The [`workflow`] module drives the whole sequence: key generation, PAT
//! login, UAT configuration registration, JWT signing and the two JWT
//! exchanges. The other modules can be used on their own.

pub mod auth;
pub mod config;
pub mod error;
pub mod grants;
pub mod scopes;
pub mod utility;
pub mod workflow;

pub use error::UatError;
pub use grants::{GrantSession, ResourceCategory};
pub use workflow::{ProgressEvent, Workflow, WorkflowResults, WorkflowSettings, WorkflowStep};
