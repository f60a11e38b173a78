// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Initial resource grants
//!
//! Grants listed in the configuration file are replayed through the regular
//! store operations, so they get the same validation as interactive input.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::grants::{GrantSession, ResourceCategory, StatusMessage};

/// Grant on a resource identified by its LUID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEntry {
    pub luid: String,
    /// Defaults to the read scope of the category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Grant on a site, known by both its content URL and its LUID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteGrantEntry {
    pub content_url: String,
    pub luid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tenants: Vec<GrantEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<SiteGrantEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<GrantEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workbooks: Vec<GrantEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub datasources: Vec<GrantEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<GrantEntry>,
}

impl GrantsConfig {
    fn entries(&self, category: ResourceCategory) -> &[GrantEntry] {
        match category {
            ResourceCategory::Tenant => &self.tenants,
            ResourceCategory::Project => &self.projects,
            ResourceCategory::Workbook => &self.workbooks,
            ResourceCategory::Datasource => &self.datasources,
            ResourceCategory::Flow => &self.flows,
            ResourceCategory::Site => &[],
        }
    }

    /// Build a grant session, returning the status of every refused entry
    pub fn to_session(&self) -> (GrantSession, Vec<StatusMessage>) {
        let mut session = GrantSession::new();
        let mut rejected = Vec::new();

        for category in ResourceCategory::ALL {
            let store = session.store_mut(category);
            let statuses: Vec<StatusMessage> = if category == ResourceCategory::Site {
                self.sites
                    .iter()
                    .map(|site| {
                        let scope = site.scope.clone().unwrap_or_else(|| category.default_scope());
                        store.add_site(&site.content_url, &site.luid, &scope).status
                    })
                    .collect()
            } else {
                self.entries(category)
                    .iter()
                    .map(|entry| {
                        let scope = entry.scope.clone().unwrap_or_else(|| category.default_scope());
                        store.add_resource(&entry.luid, &scope).status
                    })
                    .collect()
            };
            for status in statuses.into_iter().filter(|s| !s.is_success()) {
                warn!("Ignoring configured {} grant: {}", category, status);
                rejected.push(status);
            }
        }

        (session, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_session_applies_defaults_and_rejects_bad_entries() {
        let config = GrantsConfig {
            tenants: vec![GrantEntry {
                luid: "11111111-1111-1111-1111-111111111111".to_string(),
                scope: None,
            }],
            sites: vec![SiteGrantEntry {
                content_url: "finance".to_string(),
                luid: "22222222-2222-2222-2222-222222222222".to_string(),
                scope: Some("tableau:content:*".to_string()),
            }],
            projects: vec![
                GrantEntry {
                    luid: "not-a-luid".to_string(),
                    scope: None,
                },
                GrantEntry {
                    luid: "33333333-3333-3333-3333-333333333333".to_string(),
                    scope: Some("tableau:workbooks:read".to_string()),
                },
            ],
            ..Default::default()
        };

        let (session, rejected) = config.to_session();
        assert_eq!(rejected.len(), 2);
        assert_eq!(
            session.scopes(),
            vec!["tableau:tcm:read", "tableau:content:*"]
        );
        assert_eq!(session.first_site_content_url().as_deref(), Some("finance"));
    }
}
