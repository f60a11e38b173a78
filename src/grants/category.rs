// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Resource categories and their scope vocabularies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UatError;

/// Category of platform resource a grant applies to
///
/// The declaration order is the aggregation order used when building the
/// UAT configuration resource list and the JWT `scp` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    /// Cloud Manager tenant
    Tenant,
    /// Tableau Cloud site
    Site,
    Project,
    Workbook,
    Datasource,
    Flow,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 6] = [
        ResourceCategory::Tenant,
        ResourceCategory::Site,
        ResourceCategory::Project,
        ResourceCategory::Workbook,
        ResourceCategory::Datasource,
        ResourceCategory::Flow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Tenant => "tenant",
            ResourceCategory::Site => "site",
            ResourceCategory::Project => "project",
            ResourceCategory::Workbook => "workbook",
            ResourceCategory::Datasource => "datasource",
            ResourceCategory::Flow => "flow",
        }
    }

    /// Human readable label used in rendered summaries
    pub fn label(&self) -> &'static str {
        match self {
            ResourceCategory::Tenant => "Tenant",
            ResourceCategory::Site => "Site",
            ResourceCategory::Project => "Project",
            ResourceCategory::Workbook => "Workbook",
            ResourceCategory::Datasource => "Datasource",
            ResourceCategory::Flow => "Flow",
        }
    }

    /// Prefix of every scope this category may grant
    pub fn scope_prefix(&self) -> &'static str {
        match self {
            ResourceCategory::Tenant => "tableau:tcm",
            ResourceCategory::Site => "tableau:content",
            ResourceCategory::Project => "tableau:projects",
            ResourceCategory::Workbook => "tableau:workbooks",
            ResourceCategory::Datasource => "tableau:datasources",
            ResourceCategory::Flow => "tableau:flows",
        }
    }

    /// Actions accepted after the scope prefix
    pub fn allowed_actions(&self) -> &'static [&'static str] {
        match self {
            ResourceCategory::Datasource => &["read", "write", "refresh", "*"],
            _ => &["read", "write", "*"],
        }
    }

    /// Full list of scope strings this category accepts
    pub fn allowed_scopes(&self) -> Vec<String> {
        self.allowed_actions()
            .iter()
            .map(|action| format!("{}:{}", self.scope_prefix(), action))
            .collect()
    }

    /// Default scope offered to the operator (read access)
    pub fn default_scope(&self) -> String {
        format!("{}:read", self.scope_prefix())
    }

    pub fn is_allowed_scope(&self, scope: &str) -> bool {
        scope
            .strip_prefix(self.scope_prefix())
            .and_then(|rest| rest.strip_prefix(':'))
            .is_some_and(|action| self.allowed_actions().contains(&action))
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceCategory {
    type Err = UatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tenant" | "tenants" => Ok(ResourceCategory::Tenant),
            "site" | "sites" => Ok(ResourceCategory::Site),
            "project" | "projects" => Ok(ResourceCategory::Project),
            "workbook" | "workbooks" => Ok(ResourceCategory::Workbook),
            "datasource" | "datasources" => Ok(ResourceCategory::Datasource),
            "flow" | "flows" => Ok(ResourceCategory::Flow),
            other => Err(UatError::validation(format!(
                "Unknown resource category: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_vocabulary() {
        assert!(ResourceCategory::Tenant.is_allowed_scope("tableau:tcm:read"));
        assert!(ResourceCategory::Tenant.is_allowed_scope("tableau:tcm:*"));
        assert!(!ResourceCategory::Tenant.is_allowed_scope("tableau:tcm:refresh"));
        assert!(!ResourceCategory::Tenant.is_allowed_scope("tableau:content:read"));
        assert!(!ResourceCategory::Tenant.is_allowed_scope("tableau:tcmx:read"));

        assert!(ResourceCategory::Datasource.is_allowed_scope("tableau:datasources:refresh"));
        assert!(!ResourceCategory::Workbook.is_allowed_scope("tableau:workbooks:refresh"));
        assert!(ResourceCategory::Site.is_allowed_scope("tableau:content:write"));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "Projects".parse::<ResourceCategory>().unwrap(),
            ResourceCategory::Project
        );
        assert_eq!(
            "flow".parse::<ResourceCategory>().unwrap(),
            ResourceCategory::Flow
        );
        assert!("metric".parse::<ResourceCategory>().is_err());
    }

    #[test]
    fn test_allowed_scopes_listing() {
        assert_eq!(
            ResourceCategory::Flow.allowed_scopes(),
            vec!["tableau:flows:read", "tableau:flows:write", "tableau:flows:*"]
        );
        assert_eq!(
            ResourceCategory::Site.default_scope(),
            "tableau:content:read"
        );
    }
}
