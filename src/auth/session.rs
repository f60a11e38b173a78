// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Credential exchanges against Cloud Manager and Tableau Cloud
//!
//! Three exchanges share the same shape: post credentials, read a bearer
//! token back, fail on any non-2xx status:
//!
//! - PAT login on the Cloud Manager PAT endpoint
//! - JWT login on the Cloud Manager JWT endpoint
//! - JWT sign-in on the Tableau Cloud REST API of a site
//!
//! Each exchange also returns the [`CurlCommand`] that reproduces the request.
//! No exchange is retried.

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::curl::{truncate_secret, CurlCommand, DISPLAY_PREFIX_LEN};
use crate::error::UatError;

/// Header carrying the Cloud Manager session token
pub const SESSION_TOKEN_HEADER: &str = "x-tableau-session-token";

/// Default REST API version of the content sign-in endpoint
pub const DEFAULT_API_VERSION: &str = "3.27";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Opaque bearer token returned by an exchange
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// First characters of the token, for display
    pub fn truncated(&self) -> String {
        truncate_secret(&self.0, DISPLAY_PREFIX_LEN)
    }

    /// Full token, for forwarding in a header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionToken").field(&self.truncated()).finish()
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.truncated())
    }
}

/// Cloud Manager Personal Access Token credentials
#[derive(Clone)]
pub struct PatCredentials {
    pub tenant_id: String,
    pub secret: String,
    pub login_url: String,
}

impl std::fmt::Debug for PatCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("secret", &"<redacted>")
            .field("login_url", &self.login_url)
            .finish()
    }
}

/// A successful exchange
#[derive(Debug, Clone)]
pub struct Exchange {
    pub token: SessionToken,
    pub curl: CurlCommand,
}

/// Raw HTTP reply, shared with the UAT configuration client
#[derive(Debug)]
pub(crate) struct HttpReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpReply {
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Send a request, mapping transport failures to [`UatError::Network`]
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<HttpReply, UatError> {
    let response = request.send().await.map_err(|e| {
        warn!("Request to {} failed: {}", url, e);
        UatError::network(url, &e)
    })?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .text()
        .await
        .map_err(|e| UatError::network(url, &e))?;
    debug!("{} answered HTTP {}", url, status);
    Ok(HttpReply {
        status,
        headers,
        body,
    })
}

/// Client for the three token exchanges
#[derive(Debug, Clone)]
pub struct SessionExchangeClient {
    http: reqwest::Client,
}

impl SessionExchangeClient {
    /// Build a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, UatError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UatError::Config {
                reason: format!("cannot build HTTP client: {}", e),
            })?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Exchange PAT credentials for a Cloud Manager session token
    ///
    /// The secret is never part of an error: server bodies echoing it are
    /// scrubbed before they are returned.
    pub async fn pat_login(&self, credentials: &PatCredentials) -> Result<Exchange, UatError> {
        let url = credentials.login_url.as_str();
        info!("Logging into Cloud Manager with PAT at {}", url);
        let body = json!({
            "token": credentials.secret,
            "tenantId": credentials.tenant_id,
        });
        let curl = CurlCommand::new("POST", url).json(body.clone());
        let reply = send(self.http.post(url).json(&body), url).await?;

        let scrub = |text: &str| {
            if credentials.secret.is_empty() {
                text.to_string()
            } else {
                text.replace(&credentials.secret, "<redacted>")
            }
        };
        if !reply.status.is_success() {
            return Err(UatError::Authentication {
                url: url.to_string(),
                status: reply.status.as_u16(),
                body: scrub(&reply.body),
            });
        }

        let token = reply
            .json()
            .and_then(|v| v["sessionToken"].as_str().map(str::to_string))
            .or_else(|| {
                reply
                    .headers
                    .get(SESSION_TOKEN_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .ok_or_else(|| missing_token(url, &reply, scrub(&reply.body)))?;
        let token = SessionToken::new(token);
        debug!("PAT login returned session token {}", token);
        Ok(Exchange { token, curl })
    }

    /// Exchange a JWT for a Cloud Manager session token
    pub async fn tcm_jwt_login(&self, login_url: &str, jwt: &str) -> Result<Exchange, UatError> {
        info!("Logging into Cloud Manager with JWT at {}", login_url);
        let body = json!({ "token": jwt });
        let curl = CurlCommand::new("POST", login_url).json(body.clone());
        let reply = send(self.http.post(login_url).json(&body), login_url).await?;
        ensure_success(login_url, &reply)?;

        let token = reply
            .json()
            .and_then(|v| v["sessionToken"].as_str().map(str::to_string))
            .ok_or_else(|| missing_token(login_url, &reply, reply.body.clone()))?;
        Ok(Exchange {
            token: SessionToken::new(token),
            curl,
        })
    }

    /// Sign into a Tableau Cloud site with a JWT
    pub async fn content_signin(
        &self,
        pod_url: &str,
        api_version: &str,
        site_content_url: &str,
        jwt: &str,
    ) -> Result<Exchange, UatError> {
        let url = signin_url(pod_url, api_version);
        info!(
            "Signing into Tableau Cloud site '{}' with JWT at {}",
            site_content_url, url
        );
        let body = signin_body(jwt, site_content_url);
        let curl = CurlCommand::new("POST", &url)
            .header("Accept", "application/json")
            .json(body.clone());
        let request = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        let reply = send(request, &url).await?;
        ensure_success(&url, &reply)?;

        let token = reply
            .json()
            .and_then(|v| v["credentials"]["token"].as_str().map(str::to_string))
            .ok_or_else(|| missing_token(&url, &reply, reply.body.clone()))?;
        Ok(Exchange {
            token: SessionToken::new(token),
            curl,
        })
    }
}

/// `{pod}/api/{version}/auth/signin`
pub fn signin_url(pod_url: &str, api_version: &str) -> String {
    format!(
        "{}/api/{}/auth/signin",
        pod_url.trim_end_matches('/'),
        api_version
    )
}

/// Sign-in request body of the Tableau REST API
pub fn signin_body(jwt: &str, site_content_url: &str) -> Value {
    json!({
        "credentials": {
            "jwt": jwt,
            "isUat": true,
            "site": { "contentUrl": site_content_url }
        }
    })
}

fn ensure_success(url: &str, reply: &HttpReply) -> Result<(), UatError> {
    if reply.status.is_success() {
        Ok(())
    } else {
        Err(UatError::Authentication {
            url: url.to_string(),
            status: reply.status.as_u16(),
            body: reply.body.clone(),
        })
    }
}

fn missing_token(url: &str, reply: &HttpReply, body: String) -> UatError {
    UatError::Authentication {
        url: url.to_string(),
        status: reply.status.as_u16(),
        body: format!("response did not contain a session token: {}", body),
    }
}
