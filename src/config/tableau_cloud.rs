// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tableau Cloud site settings

use serde::{Deserialize, Serialize};

use crate::auth::session::DEFAULT_API_VERSION;

/// Settings for the Tableau Cloud REST API sign-in.
///
/// The site itself comes from the first site grant; only the pod and the
/// user are configured here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableauCloudConfig {
    /// Pod URL, e.g. `https://10ax.online.tableau.com`
    #[serde(default)]
    pub pod_url: String,

    /// Tableau username, used as the JWT subject
    #[serde(default)]
    pub username: String,

    /// REST API version in the sign-in path
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Default for TableauCloudConfig {
    fn default() -> Self {
        Self {
            pod_url: String::new(),
            username: String::new(),
            api_version: default_api_version(),
        }
    }
}
