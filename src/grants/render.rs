// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HTML fragments describing configured grants
//!
//! Values are HTML-escaped by handlebars, so operator input never ends up as
//! markup in the front-end.

use handlebars::Handlebars;
use log::error;
use serde_json::json;

use super::category::ResourceCategory;
use super::store::ResourceGrant;

const STORE_TEMPLATE: &str = r#"{{#if grants}}<ul class="uat-grants uat-grants-{{category}}">
{{#each grants}}  <li><code>{{luid}}</code>{{#if content_url}} <strong>{{content_url}}</strong>{{/if}} <span class="uat-scope">{{scope}}</span></li>
{{/each}}</ul>{{else}}<div class="uat-empty">No {{category}} grants configured yet</div>{{/if}}"#;

const SUMMARY_TEMPLATE: &str = r#"{{#if rows}}<div class="uat-summary">
<div class="uat-summary-title">Configuration Summary <span>Total: {{total}} resource(s)</span></div>
<table>
<thead><tr><th>Type</th><th>Identifier</th><th>LUID (Resource ID)</th><th>JWT Scope</th></tr></thead>
<tbody>
{{#each rows}}<tr><td>{{kind}}</td><td>{{identifier}}</td><td><code>{{luid}}</code></td><td>{{scope}}</td></tr>
{{/each}}</tbody>
</table>
</div>{{else}}<div class="uat-empty">No resources configured yet. Add resources to see the configuration summary.</div>{{/if}}"#;

/// Render the grant list of a single category
pub fn render_store(category: ResourceCategory, grants: &[ResourceGrant]) -> String {
    let data = json!({
        "category": category.as_str(),
        "grants": grants,
    });
    render(STORE_TEMPLATE, &data, || {
        format!("{} {} grant(s)", grants.len(), category)
    })
}

/// Render one table covering every configured grant
pub fn render_summary<'a>(grants: impl IntoIterator<Item = &'a ResourceGrant>) -> String {
    let rows: Vec<_> = grants
        .into_iter()
        .map(|grant| {
            json!({
                "kind": grant.category.label(),
                "identifier": grant.content_url.as_deref().unwrap_or(grant.category.label()),
                "luid": grant.luid,
                "scope": grant.scope,
            })
        })
        .collect();
    let total = rows.len();
    let data = json!({ "rows": rows, "total": total });
    render(SUMMARY_TEMPLATE, &data, || format!("{} resource(s)", total))
}

fn render(template: &str, data: &serde_json::Value, fallback: impl FnOnce() -> String) -> String {
    let handlebars = Handlebars::new();
    match handlebars.render_template(template, data) {
        Ok(html) => html,
        Err(e) => {
            error!("Failed to render grant template: {}", e);
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(category: ResourceCategory, luid: &str, content_url: Option<&str>) -> ResourceGrant {
        ResourceGrant {
            category,
            luid: luid.to_string(),
            content_url: content_url.map(str::to_string),
            scope: category.default_scope(),
        }
    }

    #[test]
    fn test_empty_store_message() {
        let html = render_store(ResourceCategory::Workbook, &[]);
        assert!(html.contains("No workbook grants configured yet"));
    }

    #[test]
    fn test_store_lists_grants() {
        let grants = vec![grant(
            ResourceCategory::Site,
            "11111111-1111-1111-1111-111111111111",
            Some("sandboxdev"),
        )];
        let html = render_store(ResourceCategory::Site, &grants);
        assert!(html.contains("11111111-1111-1111-1111-111111111111"));
        assert!(html.contains("sandboxdev"));
        assert!(html.contains("tableau:content:read"));
    }

    #[test]
    fn test_summary_table() {
        let grants = vec![
            grant(
                ResourceCategory::Tenant,
                "11111111-1111-1111-1111-111111111111",
                None,
            ),
            grant(
                ResourceCategory::Site,
                "22222222-2222-2222-2222-222222222222",
                Some("finance"),
            ),
        ];
        let html = render_summary(&grants);
        assert!(html.contains("Total: 2 resource(s)"));
        assert!(html.contains("<td>Tenant</td><td>Tenant</td>"));
        assert!(html.contains("<td>Site</td><td>finance</td>"));

        let empty = render_summary(std::iter::empty());
        assert!(empty.contains("No resources configured yet"));
    }
}
