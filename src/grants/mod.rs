// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Resource grants selected by the operator
//!
//! The grants decide two things at once: the resource LUIDs registered in the
//! UAT configuration and the scopes placed in the JWT `scp` claim. Both lists
//! are produced from the same [`GrantSession`] so they always line up.

pub mod category;
pub mod render;
pub mod store;

pub use category::ResourceCategory;
pub use store::{is_valid_luid, ResourceGrant, ResourceGrantStore, StatusMessage, StoreView};

/// Per-run context holding one store per resource category
///
/// The caller owns the session and lends it to the workflow; nothing is
/// shared across sessions.
#[derive(Debug, Clone)]
pub struct GrantSession {
    stores: Vec<ResourceGrantStore>,
}

impl Default for GrantSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GrantSession {
    pub fn new() -> Self {
        Self {
            stores: ResourceCategory::ALL
                .iter()
                .map(|category| ResourceGrantStore::new(*category))
                .collect(),
        }
    }

    pub fn store(&self, category: ResourceCategory) -> &ResourceGrantStore {
        &self.stores[Self::index(category)]
    }

    pub fn store_mut(&mut self, category: ResourceCategory) -> &mut ResourceGrantStore {
        &mut self.stores[Self::index(category)]
    }

    /// All grants, category by category, each in insertion order
    pub fn grants(&self) -> impl Iterator<Item = &ResourceGrant> {
        self.stores.iter().flat_map(|store| store.resources())
    }

    /// Resource LUIDs for the UAT configuration
    pub fn resource_ids(&self) -> Vec<String> {
        self.grants().map(|grant| grant.luid.clone()).collect()
    }

    /// Scopes for the JWT, aligned index by index with [`Self::resource_ids`]
    pub fn scopes(&self) -> Vec<String> {
        self.grants().map(|grant| grant.scope.clone()).collect()
    }

    /// Content URL of the first configured site, used for the sign-in check
    pub fn first_site_content_url(&self) -> Option<String> {
        self.store(ResourceCategory::Site)
            .resources()
            .first()
            .and_then(|site| site.content_url.clone())
    }

    pub fn has_sites(&self) -> bool {
        !self.store(ResourceCategory::Site).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.iter().all(ResourceGrantStore::is_empty)
    }

    /// HTML table of every configured grant
    pub fn render_summary(&self) -> String {
        render::render_summary(self.grants())
    }

    fn index(category: ResourceCategory) -> usize {
        match category {
            ResourceCategory::Tenant => 0,
            ResourceCategory::Site => 1,
            ResourceCategory::Project => 2,
            ResourceCategory::Workbook => 3,
            ResourceCategory::Datasource => 4,
            ResourceCategory::Flow => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_follows_category_order() {
        let mut session = GrantSession::new();
        session.store_mut(ResourceCategory::Flow).add_resource(
            "66666666-6666-6666-6666-666666666666",
            "tableau:flows:read",
        );
        session.store_mut(ResourceCategory::Site).add_site(
            "sandboxdev",
            "22222222-2222-2222-2222-222222222222",
            "tableau:content:read",
        );
        session.store_mut(ResourceCategory::Tenant).add_resource(
            "11111111-1111-1111-1111-111111111111",
            "tableau:tcm:read",
        );

        assert_eq!(
            session.resource_ids(),
            vec![
                "11111111-1111-1111-1111-111111111111",
                "22222222-2222-2222-2222-222222222222",
                "66666666-6666-6666-6666-666666666666",
            ]
        );
        assert_eq!(
            session.scopes(),
            vec!["tableau:tcm:read", "tableau:content:read", "tableau:flows:read"]
        );
        assert_eq!(
            session.first_site_content_url().as_deref(),
            Some("sandboxdev")
        );
    }

    #[test]
    fn test_clear_empties_every_category() {
        let mut session = GrantSession::new();
        for category in ResourceCategory::ALL {
            let store = session.store_mut(category);
            if category == ResourceCategory::Site {
                store.add_site(
                    "site",
                    "33333333-3333-3333-3333-333333333333",
                    "tableau:content:*",
                );
            } else {
                store.add_resource(
                    "33333333-3333-3333-3333-333333333333",
                    &category.default_scope(),
                );
            }
            assert_eq!(session.store(category).len(), 1);
        }

        for category in ResourceCategory::ALL {
            session.store_mut(category).clear_resources();
            assert!(session.store(category).resources().is_empty());
        }
        assert!(session.is_empty());
        assert!(!session.has_sites());
        assert!(session.scopes().is_empty());
    }
}
