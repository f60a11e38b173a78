// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! JWT and key settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::auth::jwt::DEFAULT_AUDIENCE;
use crate::auth::session::DEFAULT_TIMEOUT_SECS;

/// Settings of the issued token and of the HTTP calls.
///
/// # Fields
///
/// * `issuer` - `iss` claim, must match the issuer registered in the UAT configuration
/// * `audience` - `aud` claim (default: `tableau`)
/// * `lifetime_minutes` - token lifetime, 1 to 60 minutes (default: 5)
/// * `key_id` - optional `kid` header
/// * `key_dir` - directory receiving the generated key pair (default: `keys`)
/// * `http_timeout_secs` - timeout of every HTTP call (default: 30)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default)]
    pub issuer: String,

    #[serde(default = "default_audience")]
    pub audience: String,

    #[serde(default = "default_lifetime")]
    pub lifetime_minutes: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    #[serde(default = "default_key_dir")]
    pub key_dir: PathBuf,

    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

fn default_lifetime() -> i64 {
    5
}

fn default_key_dir() -> PathBuf {
    PathBuf::from("keys")
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            audience: default_audience(),
            lifetime_minutes: default_lifetime(),
            key_id: None,
            key_dir: default_key_dir(),
            http_timeout_secs: default_timeout(),
        }
    }
}
