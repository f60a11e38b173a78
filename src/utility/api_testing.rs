// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Connection checks replayed from the results of a workflow run
//!
//! Both checks reuse the JWT issued by the run, so they only succeed while
//! that token is still valid. They return a single line for the operator
//! instead of an error.

use log::warn;
use serde::Serialize;

use crate::auth::session::SessionExchangeClient;
use crate::workflow::{ExchangeReport, StepOutcome, WorkflowResults};

/// Placeholder shown before the workflow produced a command
pub const CURL_PLACEHOLDER: &str = "Run the workflow first to generate the cURL command";

const NO_JWT: &str = "❌ No JWT token found. Please run the workflow first.";

/// `curl` reproductions of the two JWT exchanges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurlCommands {
    pub tcm: String,
    pub tableau: String,
}

/// Extract the exchange commands from a run, placeholders for missing ones
pub fn update_curl_commands(results: &WorkflowResults) -> CurlCommands {
    fn curl_of(outcome: &Option<StepOutcome<ExchangeReport>>) -> String {
        match outcome {
            Some(StepOutcome::Success(report)) => report.curl.clone(),
            _ => CURL_PLACEHOLDER.to_string(),
        }
    }
    CurlCommands {
        tcm: curl_of(&results.exchange_tcm),
        tableau: curl_of(&results.exchange_content),
    }
}

/// Log into Cloud Manager again with the JWT of a run
pub async fn test_tcm_connection(
    client: &SessionExchangeClient,
    jwt_login_url: &str,
    results: &WorkflowResults,
) -> String {
    let Some(jwt) = results.jwt() else {
        return NO_JWT.to_string();
    };
    match client.tcm_jwt_login(jwt_login_url, jwt).await {
        Ok(exchange) => format!(
            "✅ TCM login successful! Session token: {}",
            exchange.token
        ),
        Err(e) => {
            warn!("TCM connection test failed: {}", e);
            format!("❌ TCM login failed: {}", e)
        }
    }
}

/// Sign into Tableau Cloud again with the JWT of a run
///
/// Without an explicit site the one used by the run is tried.
pub async fn test_content_connection(
    client: &SessionExchangeClient,
    pod_url: &str,
    api_version: &str,
    site_content_url: Option<&str>,
    results: &WorkflowResults,
) -> String {
    let Some(jwt) = results.jwt() else {
        return NO_JWT.to_string();
    };
    let site = site_content_url.map(str::to_string).or_else(|| {
        results
            .exchange_content
            .as_ref()
            .and_then(StepOutcome::report)
            .and_then(|report| report.site_content_url.clone())
    });
    let Some(site) = site else {
        return "⚠️ No site configured. Add a site grant to test Tableau Cloud sign-in."
            .to_string();
    };
    match client
        .content_signin(pod_url, api_version, &site, jwt)
        .await
    {
        Ok(exchange) => format!(
            "✅ Tableau Cloud login successful on site '{}'! Session token: {}",
            site, exchange.token
        ),
        Err(e) => {
            warn!("Tableau Cloud connection test failed: {}", e);
            format!("❌ Tableau Cloud login failed: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_placeholders_before_run() {
        let commands = update_curl_commands(&WorkflowResults::default());
        assert_eq!(commands.tcm, CURL_PLACEHOLDER);
        assert_eq!(commands.tableau, CURL_PLACEHOLDER);
    }

    #[test]
    fn test_commands_from_results() {
        let results = WorkflowResults {
            exchange_tcm: Some(StepOutcome::Success(ExchangeReport {
                token: "abc...".to_string(),
                curl: "curl -X POST 'https://cm/jwt'".to_string(),
                site_content_url: None,
                debug_info: None,
            })),
            exchange_content: Some(StepOutcome::Skipped {
                reason: "No sites configured".to_string(),
            }),
            ..Default::default()
        };
        let commands = update_curl_commands(&results);
        assert_eq!(commands.tcm, "curl -X POST 'https://cm/jwt'");
        assert_eq!(commands.tableau, CURL_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_connection_without_jwt() {
        let client = SessionExchangeClient::new(Duration::from_secs(1)).unwrap();
        let results = WorkflowResults::default();
        assert_eq!(
            test_tcm_connection(&client, "http://127.0.0.1:9/jwt", &results).await,
            NO_JWT
        );
        assert_eq!(
            test_content_connection(&client, "http://127.0.0.1:9", "3.27", None, &results).await,
            NO_JWT
        );
    }
}
