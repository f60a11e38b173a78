// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tableau Cloud Manager settings

use serde::{Deserialize, Serialize};

use crate::auth::session::PatCredentials;

/// Settings for the Cloud Manager control-plane API.
///
/// # Fields
///
/// * `tenant_id` - Cloud Manager tenant LUID
/// * `pat_secret` - Personal Access Token secret, better supplied through
///   the `UAT_PAT_SECRET` environment variable than stored in the file
/// * `pat_login_url` - PAT login endpoint
/// * `jwt_login_url` - JWT login endpoint
/// * `uat_configs_url` - UAT configurations collection
/// * `config_name` - Name given to the UAT configuration created by a run
#[derive(Clone, Serialize, Deserialize)]
pub struct CloudManagerConfig {
    #[serde(default)]
    pub tenant_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pat_secret: String,

    pub pat_login_url: String,

    pub jwt_login_url: String,

    pub uat_configs_url: String,

    pub config_name: String,
}

impl std::fmt::Debug for CloudManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudManagerConfig")
            .field("tenant_id", &self.tenant_id)
            .field("pat_secret", &"<redacted>")
            .field("pat_login_url", &self.pat_login_url)
            .field("jwt_login_url", &self.jwt_login_url)
            .field("uat_configs_url", &self.uat_configs_url)
            .field("config_name", &self.config_name)
            .finish()
    }
}

impl Default for CloudManagerConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            pat_secret: String::new(),
            pat_login_url: "https://cloudmanager.tableau.com/api/v1/pat/login".to_string(),
            jwt_login_url: "https://cloudmanager.tableau.com/api/v1/jwt/login".to_string(),
            uat_configs_url: "https://cloudmanager.tableau.com/api/v1/uat-configurations"
                .to_string(),
            config_name: "My-UAT-Config".to_string(),
        }
    }
}

impl CloudManagerConfig {
    pub fn credentials(&self) -> PatCredentials {
        PatCredentials {
            tenant_id: self.tenant_id.clone(),
            secret: self.pat_secret.clone(),
            login_url: self.pat_login_url.clone(),
        }
    }
}
