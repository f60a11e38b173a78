// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sequential UAT workflow
//!
//! ```text
//! Idle -> KeyGen -> PatLogin -> RegisterConfig -> IssueJwt -> ExchangeTcm
//!      -> ExchangeContent (only with a site grant) -> Done
//! ```
//!
//! Any step may end the run in `Failed`. Each call to
//! [`Workflow::next_event`] runs exactly one step and returns an event
//! carrying the cumulative results, so the caller observes progress as it
//! happens. Steps are awaited one after another; nothing runs concurrently.

use std::path::PathBuf;

use futures::stream::{self, Stream};
use log::{error, info};
use serde::Serialize;
use serde_json::json;

use super::results::{
    DebugInfo, ExchangeReport, IssueJwtReport, KeyGenReport, RegisterConfigReport, StepOutcome,
    TokenReport, WorkflowResults, WorkflowStep,
};
use crate::auth::curl::{truncate_secret, CurlCommand};
use crate::auth::jwt::{decode_payload_json, JwtIssuer};
use crate::auth::keygen::{KeyPair, KeyPairGenerator, KeyPaths};
use crate::auth::session::{
    signin_body, signin_url, PatCredentials, SessionExchangeClient, SessionToken,
};
use crate::auth::uat_config::{AuthorizationConfigClient, UatConfigRequest};
use crate::error::UatError;
use crate::grants::GrantSession;

/// Length of the JWT prefix kept in the request body diagnostics
const DEBUG_JWT_PREFIX_LEN: usize = 50;

/// Everything a run needs besides the grants
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub credentials: PatCredentials,
    pub jwt_login_url: String,
    pub uat_configs_url: String,
    pub config_name: String,
    pub pod_url: String,
    pub api_version: String,
    pub username: String,
    pub issuer: String,
    pub audience: String,
    pub lifetime_minutes: i64,
    pub key_id: Option<String>,
    pub key_dir: PathBuf,
}

/// One transition of the workflow
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// Step just completed, `Done`, or `Failed`
    pub step: WorkflowStep,
    /// Step that failed when `step` is `Failed`
    pub failed_step: Option<WorkflowStep>,
    pub message: String,
    pub results: WorkflowResults,
    pub key_paths: Option<KeyPaths>,
}

/// A single workflow run
///
/// Grants are copied out of the [`GrantSession`] when the run is created, so
/// the session may be edited again while the run is in progress.
pub struct Workflow {
    settings: WorkflowSettings,
    resource_ids: Vec<String>,
    scopes: Vec<String>,
    site_content_url: Option<String>,
    exchange: SessionExchangeClient,
    configs: AuthorizationConfigClient,
    state: WorkflowStep,
    results: WorkflowResults,
    key_pair: Option<KeyPair>,
    session: Option<SessionToken>,
    jwt: Option<String>,
    error: Option<UatError>,
}

impl Workflow {
    pub fn new(
        settings: WorkflowSettings,
        grants: &GrantSession,
        exchange: SessionExchangeClient,
    ) -> Self {
        Self {
            settings,
            resource_ids: grants.resource_ids(),
            scopes: grants.scopes(),
            site_content_url: grants.first_site_content_url(),
            configs: AuthorizationConfigClient::new(exchange.clone()),
            exchange,
            state: WorkflowStep::Idle,
            results: WorkflowResults::default(),
            key_pair: None,
            session: None,
            jwt: None,
            error: None,
        }
    }

    /// Last step reached
    pub fn state(&self) -> WorkflowStep {
        self.state
    }

    pub fn results(&self) -> &WorkflowResults {
        &self.results
    }

    /// Error that halted the run, if any
    pub fn take_error(&mut self) -> Option<UatError> {
        self.error.take()
    }

    /// Run the next step, `None` once the run is over
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        let step = self.state.next()?;
        let outcome = match step {
            WorkflowStep::KeyGen => self.generate_keys(),
            WorkflowStep::PatLogin => self.pat_login().await,
            WorkflowStep::RegisterConfig => self.register_config().await,
            WorkflowStep::IssueJwt => self.issue_jwt(),
            WorkflowStep::ExchangeTcm => self.exchange_tcm().await,
            WorkflowStep::ExchangeContent => match self.site_content_url.clone() {
                Some(site) => self.exchange_content(&site).await,
                None => {
                    info!("No sites configured, skipping Tableau Cloud sign-in");
                    self.results.exchange_content = Some(StepOutcome::Skipped {
                        reason: "No sites configured".to_string(),
                    });
                    return Some(self.finish());
                }
            },
            WorkflowStep::Done => return Some(self.finish()),
            WorkflowStep::Idle | WorkflowStep::Failed => return None,
        };

        match outcome {
            Ok(message) => {
                self.state = step;
                Some(self.event(step, None, message))
            }
            Err(e) => {
                error!("Workflow step {} failed: {}", step, e);
                self.results.record_failure(step, &e);
                self.state = WorkflowStep::Failed;
                let message = format!(
                    "❌ Step {} Failed: {}",
                    step.number().unwrap_or_default(),
                    e
                );
                self.error = Some(e);
                Some(self.event(WorkflowStep::Failed, Some(step), message))
            }
        }
    }

    /// Turn the run into a lazy stream of events
    pub fn into_stream(self) -> impl Stream<Item = ProgressEvent> {
        stream::unfold(self, |mut workflow| async move {
            let event = workflow.next_event().await?;
            Some((event, workflow))
        })
    }

    fn finish(&mut self) -> ProgressEvent {
        self.state = WorkflowStep::Done;
        info!("UAT workflow completed");
        self.event(
            WorkflowStep::Done,
            None,
            "✅ Workflow completed successfully!".to_string(),
        )
    }

    fn event(
        &self,
        step: WorkflowStep,
        failed_step: Option<WorkflowStep>,
        message: String,
    ) -> ProgressEvent {
        ProgressEvent {
            step,
            failed_step,
            message,
            results: self.results.clone(),
            key_paths: self.key_pair.as_ref().map(|pair| pair.paths().clone()),
        }
    }

    fn generate_keys(&mut self) -> Result<String, UatError> {
        info!("Step 1: Generating RSA key pair...");
        let key_pair = KeyPairGenerator::new(&self.settings.key_dir).generate()?;
        self.results.key_gen = Some(StepOutcome::Success(KeyGenReport {
            bits: key_pair.bits(),
            paths: key_pair.paths().clone(),
        }));
        self.key_pair = Some(key_pair);
        Ok("✅ Step 1: RSA key pair generated successfully".to_string())
    }

    async fn pat_login(&mut self) -> Result<String, UatError> {
        info!("Step 2: Logging into Cloud Manager with PAT...");
        let exchange = self.exchange.pat_login(&self.settings.credentials).await?;
        self.results.pat_login = Some(StepOutcome::Success(TokenReport {
            token: exchange.token.truncated(),
        }));
        self.session = Some(exchange.token);
        Ok("✅ Step 2: Successfully logged into Cloud Manager with PAT".to_string())
    }

    async fn register_config(&mut self) -> Result<String, UatError> {
        info!("Step 3: Creating UAT configuration with resource access...");
        let (Some(session), Some(key_pair)) = (&self.session, &self.key_pair) else {
            return Err(UatError::validation("no Cloud Manager session or key pair"));
        };
        let request = UatConfigRequest::new(
            &self.settings.config_name,
            &self.settings.issuer,
            key_pair.public_key_pem_str(),
            self.resource_ids.clone(),
            self.scopes.clone(),
        );
        let outcome = self
            .configs
            .register(session, &self.settings.uat_configs_url, &request)
            .await?;

        let report = RegisterConfigReport {
            name: request.name.clone(),
            config_id: outcome.config_id.clone(),
            resource_ids: self.resource_ids.clone(),
            scopes: self.scopes.clone(),
            http_status: outcome.status,
            message: outcome.message.clone(),
            payload: outcome.payload.clone(),
        };
        if outcome.success {
            self.results.register_config = Some(StepOutcome::Success(report));
            Ok(format!(
                "✅ Step 3: UAT configuration '{}' created with {} resource(s)",
                request.name,
                self.resource_ids.len()
            ))
        } else {
            let e = outcome.to_error();
            self.results.register_config = Some(StepOutcome::Failed {
                error: e.to_string(),
                detail: Some(report),
            });
            Err(e)
        }
    }

    fn issue_jwt(&mut self) -> Result<String, UatError> {
        let lifetime = self.settings.lifetime_minutes;
        info!(
            "Step 4: Generating JWT (valid for {} minutes, {} scope(s))...",
            lifetime,
            self.scopes.len()
        );
        let key_pair = self
            .key_pair
            .as_ref()
            .ok_or_else(|| UatError::Signing {
                reason: "no private key available".to_string(),
            })?;
        let token = JwtIssuer::from_key_pair(key_pair)?
            .with_audience(&self.settings.audience)
            .with_key_id(self.settings.key_id.clone())
            .build(
                &self.settings.issuer,
                lifetime,
                &self.settings.credentials.tenant_id,
                &self.settings.username,
                &self.scopes,
            )?;
        self.results.issue_jwt = Some(StepOutcome::Success(IssueJwtReport {
            token: token.clone(),
            expiration_minutes: lifetime,
            scopes: self.scopes.clone(),
        }));
        self.jwt = Some(token);
        Ok(format!(
            "✅ Step 4: JWT generated successfully (expires in {} minutes)",
            lifetime
        ))
    }

    async fn exchange_tcm(&mut self) -> Result<String, UatError> {
        info!("Step 5: Testing TCM API login with JWT...");
        let jwt = self.jwt.as_deref().ok_or_else(|| UatError::Signing {
            reason: "no JWT issued".to_string(),
        })?;
        let exchange = self
            .exchange
            .tcm_jwt_login(&self.settings.jwt_login_url, jwt)
            .await?;
        self.results.exchange_tcm = Some(StepOutcome::Success(ExchangeReport {
            token: exchange.token.truncated(),
            curl: exchange.curl.render(),
            site_content_url: None,
            debug_info: None,
        }));
        Ok("✅ Step 5: TCM API login with JWT successful".to_string())
    }

    async fn exchange_content(&mut self, site: &str) -> Result<String, UatError> {
        info!("Step 6: Testing Tableau REST API login with JWT...");
        let jwt = self.jwt.as_deref().ok_or_else(|| UatError::Signing {
            reason: "no JWT issued".to_string(),
        })?;
        let exchange = match self
            .exchange
            .content_signin(&self.settings.pod_url, &self.settings.api_version, site, jwt)
            .await
        {
            Ok(exchange) => exchange,
            Err(e) => {
                // Keep the site so the sign-in can be retried from the results
                let curl = CurlCommand::new(
                    "POST",
                    &signin_url(&self.settings.pod_url, &self.settings.api_version),
                )
                .header("Accept", "application/json")
                .json(signin_body(jwt, site));
                self.results.exchange_content = Some(StepOutcome::Failed {
                    error: e.to_string(),
                    detail: Some(ExchangeReport {
                        token: String::new(),
                        curl: curl.render(),
                        site_content_url: Some(site.to_string()),
                        debug_info: None,
                    }),
                });
                return Err(e);
            }
        };
        let debug_info = DebugInfo {
            decoded_payload: decode_payload_json(jwt)
                .unwrap_or_else(|e| json!({ "error": e.to_string() })),
            request_body_sent: signin_body(&truncate_secret(jwt, DEBUG_JWT_PREFIX_LEN), site),
        };
        self.results.exchange_content = Some(StepOutcome::Success(ExchangeReport {
            token: exchange.token.truncated(),
            curl: exchange.curl.render(),
            site_content_url: Some(site.to_string()),
            debug_info: Some(debug_info),
        }));
        Ok(format!(
            "✅ Step 6: Tableau REST API login with JWT successful on site '{}'",
            site
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grants::ResourceCategory;
    use std::time::Duration;

    fn settings(key_dir: PathBuf) -> WorkflowSettings {
        WorkflowSettings {
            credentials: PatCredentials {
                tenant_id: "11111111-1111-1111-1111-111111111111".to_string(),
                secret: "pat-secret".to_string(),
                // Nothing listens on the discard port
                login_url: "http://127.0.0.1:9/login".to_string(),
            },
            jwt_login_url: "http://127.0.0.1:9/jwt".to_string(),
            uat_configs_url: "http://127.0.0.1:9/uat".to_string(),
            config_name: "test".to_string(),
            pod_url: "http://127.0.0.1:9".to_string(),
            api_version: "3.27".to_string(),
            username: "user@example.com".to_string(),
            issuer: "issuer".to_string(),
            audience: "tableau".to_string(),
            lifetime_minutes: 5,
            key_id: None,
            key_dir,
        }
    }

    #[tokio::test]
    async fn test_network_failure_keeps_key_paths() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut grants = GrantSession::new();
        grants.store_mut(ResourceCategory::Tenant).add_resource(
            "11111111-1111-1111-1111-111111111111",
            "tableau:tcm:read",
        );
        let client = SessionExchangeClient::new(Duration::from_secs(2)).unwrap();
        let mut workflow =
            Workflow::new(settings(temp_dir.path().to_path_buf()), &grants, client);

        let first = workflow.next_event().await.unwrap();
        assert_eq!(first.step, WorkflowStep::KeyGen);
        assert!(first.key_paths.is_some());

        let second = workflow.next_event().await.unwrap();
        assert_eq!(second.step, WorkflowStep::Failed);
        assert_eq!(second.failed_step, Some(WorkflowStep::PatLogin));
        assert!(second.message.starts_with("❌ Step 2 Failed"));
        assert!(!second.message.contains("pat-secret"));
        assert!(second.key_paths.is_some());
        assert!(second.results.key_gen.as_ref().unwrap().is_success());
        assert!(second.results.pat_login.as_ref().unwrap().is_failed());

        assert!(workflow.next_event().await.is_none());
        assert_eq!(workflow.state(), WorkflowStep::Failed);
    }
}
