// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Per-category registry of resource grants
//!
//! A [`ResourceGrantStore`] keeps the ordered list of `(LUID, scope)` pairs the
//! operator selected for one [`ResourceCategory`]. Every mutating operation
//! returns a [`StoreView`]: the rendered list, the identifiers that can be
//! selected for deletion and a status line. Invalid input and duplicates never
//! mutate the store.

use std::fmt;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::category::ResourceCategory;
use super::render;
use crate::error::UatError;

static LUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("LUID pattern is a valid regex")
});

static CONTENT_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("content URL pattern is a valid regex")
});

/// Check that a string is a 36-character LUID (8-4-4-4-12 hex groups)
pub fn is_valid_luid(value: &str) -> bool {
    LUID_PATTERN.is_match(value)
}

/// One resource the token will be allowed to reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGrant {
    pub category: ResourceCategory,
    /// Resource LUID registered in the UAT configuration
    pub luid: String,
    /// Site content URL, only set for [`ResourceCategory::Site`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    /// Scope added to the JWT `scp` claim
    pub scope: String,
}

/// Outcome line returned by every store operation
#[derive(Debug)]
pub enum StatusMessage {
    Success(String),
    /// The operation was refused without changing the store
    Warning(String),
    Error(UatError),
}

impl StatusMessage {
    pub fn is_success(&self) -> bool {
        matches!(self, StatusMessage::Success(_))
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Success(msg) => write!(f, "✅ {}", msg),
            StatusMessage::Warning(msg) => write!(f, "⚠️ {}", msg),
            StatusMessage::Error(err) => write!(f, "❌ {}", err),
        }
    }
}

/// Snapshot handed back to the caller after each store operation
#[derive(Debug)]
pub struct StoreView {
    /// HTML fragment listing the grants of the store
    pub rendered: String,
    /// Identifiers accepted by [`ResourceGrantStore::delete_resource`]
    pub choices: Vec<String>,
    pub status: StatusMessage,
}

/// Ordered, duplicate-free list of grants for one category
#[derive(Debug, Clone)]
pub struct ResourceGrantStore {
    category: ResourceCategory,
    resources: Vec<ResourceGrant>,
}

impl ResourceGrantStore {
    pub fn new(category: ResourceCategory) -> Self {
        Self {
            category,
            resources: Vec::new(),
        }
    }

    pub fn category(&self) -> ResourceCategory {
        self.category
    }

    /// Grants in insertion order
    pub fn resources(&self) -> &[ResourceGrant] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Add a `(LUID, scope)` grant to a non-site category
    pub fn add_resource(&mut self, identifier: &str, scope: &str) -> StoreView {
        if self.category == ResourceCategory::Site {
            return self.view(StatusMessage::Error(UatError::validation(
                "Site grants need a content URL, use add_site",
            )));
        }

        // The LUID is checked as given, padded input is not a LUID
        let scope = scope.trim();
        if let Err(err) = self.validate(identifier, scope) {
            return self.view(StatusMessage::Error(err));
        }

        if self.contains(identifier) {
            warn!(
                "Refusing duplicate {} grant for {}",
                self.category, identifier
            );
            return self.view(StatusMessage::Warning(format!(
                "{} {} is already configured",
                self.category.label(),
                identifier
            )));
        }

        debug!("Adding {} grant {} ({})", self.category, identifier, scope);
        self.resources.push(ResourceGrant {
            category: self.category,
            luid: identifier.to_string(),
            content_url: None,
            scope: scope.to_string(),
        });
        self.view(StatusMessage::Success(format!(
            "{} {} added with scope {}",
            self.category.label(),
            identifier,
            scope
        )))
    }

    /// Add a site grant carrying both its content URL and its LUID
    pub fn add_site(&mut self, content_url: &str, luid: &str, scope: &str) -> StoreView {
        if self.category != ResourceCategory::Site {
            return self.view(StatusMessage::Error(UatError::validation(format!(
                "Content URLs only apply to site grants, not {}",
                self.category
            ))));
        }

        let content_url = content_url.trim();
        let scope = scope.trim();
        if content_url.is_empty() {
            return self.view(StatusMessage::Error(UatError::validation(
                "Site content URL is required",
            )));
        }
        if !CONTENT_URL_PATTERN.is_match(content_url) {
            return self.view(StatusMessage::Error(UatError::validation(format!(
                "Site content URL '{}' may only contain letters, digits, '-' and '_'",
                content_url
            ))));
        }
        if let Err(err) = self.validate(luid, scope) {
            return self.view(StatusMessage::Error(err));
        }

        let duplicate = self.resources.iter().any(|site| {
            site.luid.eq_ignore_ascii_case(luid) || site.content_url.as_deref() == Some(content_url)
        });
        if duplicate {
            warn!("Refusing duplicate site grant {} ({})", content_url, luid);
            return self.view(StatusMessage::Warning(format!(
                "Site {} ({}) is already configured",
                content_url, luid
            )));
        }

        debug!("Adding site grant {} ({}) with {}", content_url, luid, scope);
        self.resources.push(ResourceGrant {
            category: ResourceCategory::Site,
            luid: luid.to_string(),
            content_url: Some(content_url.to_string()),
            scope: scope.to_string(),
        });
        self.view(StatusMessage::Success(format!(
            "Site {} added with scope {}",
            content_url, scope
        )))
    }

    /// Remove the grant with the given LUID
    pub fn delete_resource(&mut self, identifier: &str) -> StoreView {
        let identifier = identifier.trim();
        match self
            .resources
            .iter()
            .position(|grant| grant.luid.eq_ignore_ascii_case(identifier))
        {
            Some(index) => {
                let removed = self.resources.remove(index);
                debug!("Removed {} grant {}", self.category, removed.luid);
                self.view(StatusMessage::Success(format!(
                    "{} {} removed",
                    self.category.label(),
                    removed.luid
                )))
            }
            None => self.view(StatusMessage::Warning(format!(
                "No {} with identifier '{}' to remove",
                self.category, identifier
            ))),
        }
    }

    /// Drop every grant of this category
    pub fn clear_resources(&mut self) -> StoreView {
        let removed = self.resources.len();
        self.resources.clear();
        self.view(StatusMessage::Success(format!(
            "Cleared {} {} grant(s)",
            removed, self.category
        )))
    }

    /// Current view without a state change
    pub fn snapshot(&self) -> StoreView {
        self.view(StatusMessage::Success(format!(
            "{} {} grant(s) configured",
            self.resources.len(),
            self.category
        )))
    }

    fn contains(&self, luid: &str) -> bool {
        self.resources
            .iter()
            .any(|grant| grant.luid.eq_ignore_ascii_case(luid))
    }

    fn validate(&self, luid: &str, scope: &str) -> Result<(), UatError> {
        if luid.is_empty() {
            return Err(UatError::validation(format!(
                "{} LUID is required",
                self.category.label()
            )));
        }
        if !is_valid_luid(luid) {
            return Err(UatError::validation(format!(
                "{} LUID '{}' must be a 36-character UUID (xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx)",
                self.category.label(),
                luid
            )));
        }
        if !self.category.is_allowed_scope(scope) {
            return Err(UatError::validation(format!(
                "Scope '{}' is not valid for {}; expected one of {}",
                scope,
                self.category,
                self.category.allowed_scopes().join(", ")
            )));
        }
        Ok(())
    }

    fn view(&self, status: StatusMessage) -> StoreView {
        StoreView {
            rendered: render::render_store(self.category, &self.resources),
            choices: self.resources.iter().map(|g| g.luid.clone()).collect(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LUID_A: &str = "11111111-1111-1111-1111-111111111111";
    const LUID_B: &str = "a1b2c3d4-e5f6-7890-abcd-ef1234567890";

    #[test]
    fn test_luid_validation() {
        assert!(is_valid_luid(LUID_A));
        assert!(is_valid_luid(LUID_B));
        assert!(is_valid_luid("A1B2C3D4-E5F6-7890-ABCD-EF1234567890"));

        for bad in [
            "",
            "not-a-luid",
            "a1b2c3d4e5f67890abcdef1234567890",
            "a1b2c3d4-e5f6-7890-abcd-ef123456789",
            "a1b2c3d4-e5f6-7890-abcd-ef12345678901",
            "g1b2c3d4-e5f6-7890-abcd-ef1234567890",
            "{a1b2c3d4-e5f6-7890-abcd-ef1234567890}",
            " a1b2c3d4-e5f6-7890-abcd-ef1234567890x",
        ] {
            assert!(!is_valid_luid(bad), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut store = ResourceGrantStore::new(ResourceCategory::Project);
        assert!(store
            .add_resource(LUID_B, "tableau:projects:write")
            .status
            .is_success());
        let view = store.add_resource(LUID_A, "tableau:projects:read");
        assert!(view.status.is_success());
        assert_eq!(view.choices, vec![LUID_B, LUID_A]);
        assert_eq!(store.resources()[0].scope, "tableau:projects:write");
        assert_eq!(store.resources()[1].scope, "tableau:projects:read");
    }

    #[test]
    fn test_invalid_input_leaves_store_unchanged() {
        let mut store = ResourceGrantStore::new(ResourceCategory::Workbook);
        store.add_resource(LUID_A, "tableau:workbooks:read");

        let view = store.add_resource("1234", "tableau:workbooks:read");
        assert!(matches!(
            view.status,
            StatusMessage::Error(UatError::Validation { .. })
        ));
        let view = store.add_resource(LUID_B, "tableau:projects:read");
        assert!(matches!(
            view.status,
            StatusMessage::Error(UatError::Validation { .. })
        ));
        let view = store.add_resource("", "tableau:workbooks:read");
        assert!(matches!(view.status, StatusMessage::Error(_)));

        assert_eq!(store.len(), 1);
        assert_eq!(view.choices, vec![LUID_A]);
    }

    #[test]
    fn test_padded_luid_is_rejected() {
        let mut tenants = ResourceGrantStore::new(ResourceCategory::Tenant);
        for padded in [
            " 11111111-1111-1111-1111-111111111111 ",
            "11111111-1111-1111-1111-111111111111\n",
            "\t11111111-1111-1111-1111-111111111111",
        ] {
            let view = tenants.add_resource(padded, "tableau:tcm:read");
            assert!(matches!(
                view.status,
                StatusMessage::Error(UatError::Validation { .. })
            ));
        }
        assert!(tenants.is_empty());

        let mut sites = ResourceGrantStore::new(ResourceCategory::Site);
        let view = sites.add_site(
            "finance",
            " 22222222-2222-2222-2222-222222222222",
            "tableau:content:read",
        );
        assert!(matches!(
            view.status,
            StatusMessage::Error(UatError::Validation { .. })
        ));
        assert!(sites.is_empty());
    }

    #[test]
    fn test_duplicate_is_rejected_with_warning() {
        let mut store = ResourceGrantStore::new(ResourceCategory::Tenant);
        store.add_resource(LUID_A, "tableau:tcm:read");
        let view = store.add_resource(LUID_A, "tableau:tcm:write");
        assert!(matches!(view.status, StatusMessage::Warning(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.resources()[0].scope, "tableau:tcm:read");

        // Case differences do not make a new resource
        let view = store.add_resource(&LUID_B.to_uppercase(), "tableau:tcm:read");
        assert!(view.status.is_success());
        let view = store.add_resource(LUID_B, "tableau:tcm:read");
        assert!(matches!(view.status, StatusMessage::Warning(_)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_and_clear() {
        let mut store = ResourceGrantStore::new(ResourceCategory::Flow);
        store.add_resource(LUID_A, "tableau:flows:read");
        store.add_resource(LUID_B, "tableau:flows:*");

        let view = store.delete_resource("ffffffff-ffff-ffff-ffff-ffffffffffff");
        assert!(matches!(view.status, StatusMessage::Warning(_)));
        assert_eq!(store.len(), 2);

        let view = store.delete_resource(LUID_A);
        assert!(view.status.is_success());
        assert_eq!(view.choices, vec![LUID_B]);

        let view = store.clear_resources();
        assert!(view.status.is_success());
        assert!(view.choices.is_empty());
        assert!(store.resources().is_empty());
    }

    #[test]
    fn test_site_store_keeps_both_identifiers() {
        let mut store = ResourceGrantStore::new(ResourceCategory::Site);
        let view = store.add_resource(LUID_A, "tableau:content:read");
        assert!(matches!(view.status, StatusMessage::Error(_)));

        let view = store.add_site("sandboxdev", LUID_A, "tableau:content:read");
        assert!(view.status.is_success());
        let site = &store.resources()[0];
        assert_eq!(site.luid, LUID_A);
        assert_eq!(site.content_url.as_deref(), Some("sandboxdev"));

        let view = store.add_site("sandboxdev", LUID_B, "tableau:content:read");
        assert!(matches!(view.status, StatusMessage::Warning(_)));
        let view = store.add_site("other site", LUID_B, "tableau:content:read");
        assert!(matches!(view.status, StatusMessage::Error(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_non_site_store_rejects_content_url() {
        let mut store = ResourceGrantStore::new(ResourceCategory::Datasource);
        let view = store.add_site("sandboxdev", LUID_A, "tableau:datasources:read");
        assert!(matches!(view.status, StatusMessage::Error(_)));
        assert!(store.is_empty());
    }
}
