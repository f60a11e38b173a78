// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! Schema output and the validation rules that the JSON schema cannot express.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::Config;
use crate::auth::jwt::LIFETIME_RANGE;
use crate::grants::is_valid_luid;

/// JSON schema embedded in the binary
pub const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Output the embedded JSON schema to the console.
///
/// Called for the `--show-config-schema` flag.
///
/// # Example
///
/// ```bash
/// ./rust_uat_config --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;
    println!("{}", formatted_schema);
    Ok(())
}

/// Check that a string is an absolute http(s) URL
pub fn is_valid_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Validates the configuration against rules the JSON schema does not cover.
///
/// # Validation Rules
///
/// - **URLs**: Cloud Manager endpoints must be http(s) URLs; the pod URL too when set
/// - **Lifetime**: the token lifetime must be within 1-60 minutes
/// - **Tenant**: the tenant id, when set, must be a LUID
/// - **Timeout**: the HTTP timeout must not be zero
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    let cm = &config.cloud_manager;
    for (name, value) in [
        ("pat_login_url", &cm.pat_login_url),
        ("jwt_login_url", &cm.jwt_login_url),
        ("uat_configs_url", &cm.uat_configs_url),
    ] {
        if !is_valid_http_url(value) {
            anyhow::bail!("cloud_manager.{} is not a valid URL: {}", name, value);
        }
    }

    if !config.tableau_cloud.pod_url.is_empty() && !is_valid_http_url(&config.tableau_cloud.pod_url)
    {
        anyhow::bail!(
            "tableau_cloud.pod_url is not a valid URL: {}",
            config.tableau_cloud.pod_url
        );
    }

    if !LIFETIME_RANGE.contains(&config.token.lifetime_minutes) {
        anyhow::bail!(
            "token.lifetime_minutes must be between {} and {}, got {}",
            LIFETIME_RANGE.start(),
            LIFETIME_RANGE.end(),
            config.token.lifetime_minutes
        );
    }

    if !cm.tenant_id.is_empty() && !is_valid_luid(&cm.tenant_id) {
        anyhow::bail!("cloud_manager.tenant_id is not a LUID: {}", cm.tenant_id);
    }

    if config.token.http_timeout_secs == 0 {
        anyhow::bail!("token.http_timeout_secs must be at least 1");
    }

    Ok(())
}

/// Warn when the file itself carries the PAT secret.
///
/// Only meaningful on a freshly loaded file, before command line overrides
/// put a secret in the configuration. Returns whether a warning was issued.
pub fn warn_on_stored_secret(config: &Config) -> bool {
    if config.cloud_manager.pat_secret.is_empty() {
        return false;
    }
    warn!("PAT secret is stored in the configuration file, prefer UAT_PAT_SECRET");
    true
}
