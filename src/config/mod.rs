// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the UAT tool
//!
//! The configuration is backed by a YAML file and validated against a JSON
//! schema before it is deserialized.
//!
//! ## Configuration Structure
//!
//! - `cloud_manager`: Cloud Manager tenant, PAT credentials and endpoints
//! - `tableau_cloud`: pod URL, username and REST API version
//! - `token`: JWT claims, key directory and HTTP timeout
//! - `grants`: initial resource grants per category
//!
//! ## Usage
//!
//! ```no_run
//! use rust_uat_config::config::Config;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file("uat_config.yaml").unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some("11111111-1111-1111-1111-111111111111".to_string()), // Tenant id
//!     None,                                                     // PAT secret
//!     Some("https://10ax.online.tableau.com".to_string()),      // Pod URL
//!     Some("user@example.com".to_string()),                     // Username
//!     Some("my-issuer".to_string()),                            // Issuer
//!     Some(10),                                                 // Lifetime
//!     None,                                                     // Config name
//!     None,                                                     // Key directory
//! );
//! ```

pub mod cloud_manager;
pub mod grants;
pub mod tableau_cloud;
pub mod token;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use cloud_manager::CloudManagerConfig;
pub use grants::{GrantEntry, GrantsConfig, SiteGrantEntry};
pub use tableau_cloud::TableauCloudConfig;
pub use token::TokenConfig;
pub use utils::{
    output_config_schema, validate_specific_rules, warn_on_stored_secret, CONFIG_SCHEMA,
};

use crate::error::UatError;
use crate::workflow::WorkflowSettings;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "uat_config.yaml";

/// Root configuration structure.
///
/// Every section falls back to its defaults when absent from the file, so a
/// minimal file only needs the tenant, the pod and the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cloud_manager: CloudManagerConfig,

    #[serde(default)]
    pub tableau_cloud: TableauCloudConfig,

    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub grants: GrantsConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Original path: {:?}, Sample path: {:?}", path, sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        let yaml_value: serde_yml::Value = serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;
        let json_value = serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })?;

        let schema: serde_json::Value =
            serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        debug!("Validating {} configuration against schema", path.display());
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        let config: Config = match serde_yml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        if let Err(err) = validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }
        warn_on_stored_secret(&config);

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only the values that are provided override the file.
    ///
    /// # Parameters
    ///
    /// * `tenant_id` - Cloud Manager tenant LUID
    /// * `pat_secret` - PAT secret (usually from `UAT_PAT_SECRET`)
    /// * `pod_url` - Tableau Cloud pod URL
    /// * `username` - Tableau username, the JWT subject
    /// * `issuer` - JWT issuer
    /// * `lifetime_minutes` - JWT lifetime
    /// * `config_name` - UAT configuration name
    /// * `key_dir` - output directory of the key pair
    #[allow(clippy::too_many_arguments)]
    pub fn apply_args(
        &mut self,
        tenant_id: Option<String>,
        pat_secret: Option<String>,
        pod_url: Option<String>,
        username: Option<String>,
        issuer: Option<String>,
        lifetime_minutes: Option<i64>,
        config_name: Option<String>,
        key_dir: Option<PathBuf>,
    ) {
        if let Some(tenant_id) = tenant_id {
            debug!("Overriding tenant id from command line: {}", tenant_id);
            self.cloud_manager.tenant_id = tenant_id;
        }
        if let Some(secret) = pat_secret {
            debug!("Overriding PAT secret from command line");
            self.cloud_manager.pat_secret = secret;
        }
        if let Some(pod_url) = pod_url {
            debug!("Overriding pod URL from command line: {}", pod_url);
            self.tableau_cloud.pod_url = pod_url;
        }
        if let Some(username) = username {
            debug!("Overriding username from command line: {}", username);
            self.tableau_cloud.username = username;
        }
        if let Some(issuer) = issuer {
            debug!("Overriding issuer from command line: {}", issuer);
            self.token.issuer = issuer;
        }
        if let Some(lifetime) = lifetime_minutes {
            debug!("Overriding JWT lifetime from command line: {}", lifetime);
            self.token.lifetime_minutes = lifetime;
        }
        if let Some(name) = config_name {
            debug!("Overriding UAT configuration name from command line: {}", name);
            self.cloud_manager.config_name = name;
        }
        if let Some(dir) = key_dir {
            debug!("Overriding key directory from command line: {:?}", dir);
            self.token.key_dir = dir;
        }
    }

    /// Fail unless a PAT secret is available for Cloud Manager calls
    pub fn ensure_pat_secret(&self) -> Result<(), UatError> {
        if self.cloud_manager.pat_secret.is_empty() {
            return Err(UatError::validation(
                "no PAT secret given, use --pat-secret or the UAT_PAT_SECRET environment variable",
            ));
        }
        Ok(())
    }

    /// Fail unless a workflow run has everything it signs and registers
    ///
    /// An empty issuer would be registered as is and an empty username would
    /// become the token subject.
    pub fn ensure_workflow_ready(&self) -> Result<(), UatError> {
        self.ensure_pat_secret()?;
        if self.token.issuer.trim().is_empty() {
            return Err(UatError::validation(
                "no JWT issuer given, set token.issuer or use --issuer",
            ));
        }
        if self.tableau_cloud.username.trim().is_empty() {
            return Err(UatError::validation(
                "no Tableau username given, set tableau_cloud.username or use --username",
            ));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.token.http_timeout_secs)
    }

    /// Settings of a workflow run
    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            credentials: self.cloud_manager.credentials(),
            jwt_login_url: self.cloud_manager.jwt_login_url.clone(),
            uat_configs_url: self.cloud_manager.uat_configs_url.clone(),
            config_name: self.cloud_manager.config_name.clone(),
            pod_url: self.tableau_cloud.pod_url.clone(),
            api_version: self.tableau_cloud.api_version.clone(),
            username: self.tableau_cloud.username.clone(),
            issuer: self.token.issuer.clone(),
            audience: self.token.audience.clone(),
            lifetime_minutes: self.token.lifetime_minutes,
            key_id: self.token.key_id.clone(),
            key_dir: self.token.key_dir.clone(),
        }
    }
}
