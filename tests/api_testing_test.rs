// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::time::Duration;

use rust_uat_config::auth::SessionExchangeClient;
use rust_uat_config::utility::{test_content_connection, test_tcm_connection};
use rust_uat_config::workflow::{
    ExchangeReport, IssueJwtReport, StepOutcome, WorkflowResults,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JWT: &str = "eyJhbGciOiJSUzI1NiJ9.eyJzY3AiOltdfQ.signature";

fn client() -> SessionExchangeClient {
    SessionExchangeClient::new(Duration::from_secs(10)).unwrap()
}

/// Results of a run that issued a JWT and signed into `site`
fn results_with_site(site: Option<&str>) -> WorkflowResults {
    WorkflowResults {
        issue_jwt: Some(StepOutcome::Success(IssueJwtReport {
            token: JWT.to_string(),
            expiration_minutes: 5,
            scopes: vec!["tableau:tcm:read".to_string()],
        })),
        exchange_content: site.map(|site| {
            StepOutcome::Success(ExchangeReport {
                token: "rest-token".to_string(),
                curl: String::new(),
                site_content_url: Some(site.to_string()),
                debug_info: None,
            })
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_tcm_connection_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jwt/login"))
        .and(body_partial_json(json!({ "token": JWT })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionToken": "0123456789abcdefghijklmnopqrstuvwxyz"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let line = test_tcm_connection(
        &client(),
        &format!("{}/api/v1/jwt/login", server.uri()),
        &results_with_site(None),
    )
    .await;
    assert!(line.starts_with("✅ TCM login successful"), "{}", line);
    // Session token is shown truncated
    assert!(line.contains("0123456789abcdefghij..."));
    assert!(!line.contains("uvwxyz"));
}

#[tokio::test]
async fn test_tcm_connection_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/jwt/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let line = test_tcm_connection(
        &client(),
        &format!("{}/api/v1/jwt/login", server.uri()),
        &results_with_site(None),
    )
    .await;
    assert!(line.starts_with("❌ TCM login failed"), "{}", line);
    assert!(line.contains("401"));
    assert!(line.contains("token expired"));
}

#[tokio::test]
async fn test_content_connection_uses_site_of_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/3.27/auth/signin"))
        .and(body_partial_json(json!({
            "credentials": { "jwt": JWT, "isUat": true, "site": { "contentUrl": "finance" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "credentials": { "token": "rest-token" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let line = test_content_connection(
        &client(),
        &server.uri(),
        "3.27",
        None,
        &results_with_site(Some("finance")),
    )
    .await;
    assert!(
        line.starts_with("✅ Tableau Cloud login successful on site 'finance'"),
        "{}",
        line
    );
}

#[tokio::test]
async fn test_content_connection_explicit_site_and_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/3.27/auth/signin"))
        .and(body_partial_json(json!({
            "credentials": { "site": { "contentUrl": "sales" } }
        })))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let line = test_content_connection(
        &client(),
        &server.uri(),
        "3.27",
        Some("sales"),
        &results_with_site(Some("finance")),
    )
    .await;
    assert!(line.starts_with("❌ Tableau Cloud login failed"), "{}", line);
    assert!(line.contains("500"));
}

#[tokio::test]
async fn test_content_connection_without_site() {
    let server = MockServer::start().await;
    let line = test_content_connection(
        &client(),
        &server.uri(),
        "3.27",
        None,
        &results_with_site(None),
    )
    .await;
    assert!(line.starts_with("⚠️ No site configured"), "{}", line);
}
