// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Catalogue of known Tableau scope families
//!
//! The grant stores only accept the scopes of their own category; this table
//! documents the wider vocabulary that Tableau Cloud and Cloud Manager know
//! about, so operators can look scopes up from the command line.

use serde::Serialize;

/// One family of scopes sharing a prefix
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScopeDefinition {
    pub key: &'static str,
    pub prefix: &'static str,
    pub actions: &'static [&'static str],
    pub description: &'static str,
}

impl ScopeDefinition {
    /// Every `prefix:action` string of the family
    pub fn scopes(&self) -> Vec<String> {
        self.actions
            .iter()
            .map(|action| format!("{}:{}", self.prefix, action))
            .collect()
    }
}

/// Actions every family can fall back to
pub const COMMON_ACTIONS: &[&str] = &["read", "write", "*"];

pub const SCOPE_DEFINITIONS: &[ScopeDefinition] = &[
    ScopeDefinition {
        key: "tcm_sites",
        prefix: "tableau:tcm_sites",
        actions: &["read", "update"],
        description: "Manage Tableau Cloud Manager sites (view status, update settings).",
    },
    ScopeDefinition {
        key: "tcm_users",
        prefix: "tableau:tcm_users",
        actions: &["read", "update"],
        description: "Manage user accounts at the tenant level (view info, update details).",
    },
    ScopeDefinition {
        key: "tcm_groups",
        prefix: "tableau:tcm_groups",
        actions: &["read", "update"],
        description: "Manage user groups at the tenant level.",
    },
    ScopeDefinition {
        key: "projects",
        prefix: "tableau:projects",
        actions: &["read", "write"],
        description: "Manage projects (view, create, update, delete).",
    },
    ScopeDefinition {
        key: "datasources",
        prefix: "tableau:datasources",
        actions: &["read", "write", "refresh"],
        description: "Manage data sources (view, publish, update, delete, refresh).",
    },
    ScopeDefinition {
        key: "workbooks",
        prefix: "tableau:workbooks",
        actions: &["read", "write"],
        description: "Manage workbooks (view, publish, update, delete).",
    },
    ScopeDefinition {
        key: "flows",
        prefix: "tableau:flows",
        actions: &["read", "write"],
        description: "Manage flows (view, publish, update, delete).",
    },
    ScopeDefinition {
        key: "metrics",
        prefix: "tableau:metrics",
        actions: &["read", "write"],
        description: "Manage metrics (view, create, update, delete).",
    },
    ScopeDefinition {
        key: "tasks",
        prefix: "tableau:tasks",
        actions: &["read", "write"],
        description: "Manage scheduled tasks (view, run, update, delete).",
    },
    ScopeDefinition {
        key: "subscriptions",
        prefix: "tableau:subscriptions",
        actions: &["read", "write"],
        description: "Manage subscriptions (view, create, update, delete).",
    },
    ScopeDefinition {
        key: "users",
        prefix: "tableau:users",
        actions: &["read", "write"],
        description: "Manage users on a site (view, add, remove, update).",
    },
    ScopeDefinition {
        key: "groups",
        prefix: "tableau:groups",
        actions: &["read", "write"],
        description: "Manage user groups on a site (view, create, update, delete).",
    },
    ScopeDefinition {
        key: "sites",
        prefix: "tableau:sites",
        actions: &["read", "write", "*"],
        description: "Manage site settings (view, update) or get all permissions with '*'.",
    },
    ScopeDefinition {
        key: "content",
        prefix: "tableau:content",
        actions: &["read", "write", "*"],
        description: "Generic access to content (view, create, update, delete) or all with '*'.",
    },
];

/// Look a family up by key (`projects`) or prefix (`tableau:projects`)
pub fn find(name: &str) -> Option<&'static ScopeDefinition> {
    SCOPE_DEFINITIONS
        .iter()
        .find(|def| def.key == name || def.prefix == name)
}

/// All scope strings of the catalogue, in catalogue order
pub fn all_scopes() -> Vec<String> {
    SCOPE_DEFINITIONS
        .iter()
        .flat_map(ScopeDefinition::scopes)
        .collect()
}

/// True if the scope belongs to a known family and action
pub fn is_known_scope(scope: &str) -> bool {
    scope.rsplit_once(':').is_some_and(|(prefix, action)| {
        SCOPE_DEFINITIONS
            .iter()
            .any(|def| def.prefix == prefix && def.actions.contains(&action))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_key_or_prefix() {
        let by_key = find("datasources").unwrap();
        let by_prefix = find("tableau:datasources").unwrap();
        assert_eq!(by_key.prefix, by_prefix.prefix);
        assert_eq!(
            by_key.scopes(),
            vec![
                "tableau:datasources:read",
                "tableau:datasources:write",
                "tableau:datasources:refresh"
            ]
        );
        assert!(find("dashboards").is_none());
    }

    #[test]
    fn test_known_scopes() {
        assert!(is_known_scope("tableau:content:*"));
        assert!(is_known_scope("tableau:tcm_users:update"));
        assert!(!is_known_scope("tableau:tcm_users:write"));
        assert!(!is_known_scope("content"));
        assert_eq!(all_scopes().len(), 31);
    }
}
