// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! UAT configuration management on Cloud Manager
//!
//! A UAT configuration registers the public key, the issuer and the resource
//! LUIDs a token may reach. Rejections by the server (name clash, bad
//! resource id, ...) are business outcomes reported with `success = false`;
//! only transport failures and failed logins are errors.

use log::{info, warn};
use serde::Serialize;
use serde_json::{json, Value};

use super::curl::CurlCommand;
use super::session::{
    send, HttpReply, PatCredentials, SessionExchangeClient, SessionToken, SESSION_TOKEN_HEADER,
};
use crate::error::UatError;

/// Claim of the JWT holding the Tableau username
pub const DEFAULT_USERNAME_CLAIM: &str = "email";

/// Body of a UAT configuration creation request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UatConfigRequest {
    pub name: String,
    pub issuer: String,
    pub public_key: String,
    pub username_claim: String,
    pub resource_ids: Vec<String>,
    pub scopes: Vec<String>,
    pub enabled: bool,
}

impl UatConfigRequest {
    pub fn new(
        name: impl Into<String>,
        issuer: impl Into<String>,
        public_key: impl Into<String>,
        resource_ids: Vec<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            issuer: issuer.into(),
            public_key: public_key.into(),
            username_claim: DEFAULT_USERNAME_CLAIM.to_string(),
            resource_ids,
            scopes,
            enabled: true,
        }
    }
}

/// Result of a registration attempt
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    pub success: bool,
    pub status: u16,
    pub config_id: Option<String>,
    pub message: Option<String>,
    pub payload: Value,
    #[serde(skip)]
    pub curl: CurlCommand,
}

impl RegistrationOutcome {
    /// Error describing a rejected registration
    pub fn to_error(&self) -> UatError {
        UatError::Registration {
            message: format!(
                "HTTP {}: {}",
                self.status,
                self.message.as_deref().unwrap_or("Unknown error")
            ),
        }
    }
}

/// Existing configurations of the tenant
#[derive(Debug, Clone, Serialize)]
pub struct ConfigListing {
    pub success: bool,
    pub message: Option<String>,
    pub configs: Vec<Value>,
    pub config_ids: Vec<String>,
    #[serde(skip)]
    pub curl: CurlCommand,
}

/// Result of a revocation
#[derive(Debug, Clone, Serialize)]
pub struct RevokeOutcome {
    pub success: bool,
    pub status: u16,
    pub payload: Value,
    #[serde(skip)]
    pub curl: CurlCommand,
}

/// Client for `uat-configurations` on Cloud Manager
#[derive(Debug, Clone)]
pub struct AuthorizationConfigClient {
    exchange: SessionExchangeClient,
}

impl AuthorizationConfigClient {
    pub fn new(exchange: SessionExchangeClient) -> Self {
        Self { exchange }
    }

    /// PAT login, see [`SessionExchangeClient::pat_login`]
    pub async fn login(&self, credentials: &PatCredentials) -> Result<SessionToken, UatError> {
        Ok(self.exchange.pat_login(credentials).await?.token)
    }

    /// Create a UAT configuration
    ///
    /// Returns `Err` only when the server cannot be reached.
    pub async fn register(
        &self,
        session: &SessionToken,
        configs_url: &str,
        request: &UatConfigRequest,
    ) -> Result<RegistrationOutcome, UatError> {
        info!(
            "Creating UAT configuration '{}' with {} resource(s) and {} scope(s)",
            request.name,
            request.resource_ids.len(),
            request.scopes.len()
        );
        let body = serde_json::to_value(request).map_err(|e| UatError::Registration {
            message: format!("cannot serialize configuration request: {}", e),
        })?;
        let curl = CurlCommand::new("POST", configs_url)
            .header(SESSION_TOKEN_HEADER, session.expose())
            .json(body.clone());
        let http_request = self
            .exchange
            .http()
            .post(configs_url)
            .header(SESSION_TOKEN_HEADER, session.expose())
            .json(&body);
        let reply = send(http_request, configs_url).await?;
        let payload = payload_of(&reply);

        if reply.status.is_success() {
            let config_id = payload
                .get("id")
                .or_else(|| payload.get("configId"))
                .and_then(value_as_id);
            if config_id.is_none() {
                warn!("UAT configuration created but the response carried no id");
            }
            info!("UAT configuration created with id {:?}", config_id);
            Ok(RegistrationOutcome {
                success: true,
                status: reply.status.as_u16(),
                config_id,
                message: None,
                payload,
                curl,
            })
        } else {
            let message = error_message(&reply, &payload);
            warn!(
                "UAT configuration '{}' rejected with HTTP {}: {}",
                request.name, reply.status, message
            );
            Ok(RegistrationOutcome {
                success: false,
                status: reply.status.as_u16(),
                config_id: None,
                message: Some(message),
                payload,
                curl,
            })
        }
    }

    /// List the UAT configurations of the tenant
    pub async fn list(
        &self,
        credentials: &PatCredentials,
        configs_url: &str,
    ) -> Result<ConfigListing, UatError> {
        let session = self.login(credentials).await?;
        let curl =
            CurlCommand::new("GET", configs_url).header(SESSION_TOKEN_HEADER, session.expose());
        let request = self
            .exchange
            .http()
            .get(configs_url)
            .header(SESSION_TOKEN_HEADER, session.expose());
        let reply = send(request, configs_url).await?;
        let payload = payload_of(&reply);

        if !reply.status.is_success() {
            let message = error_message(&reply, &payload);
            warn!("Listing UAT configurations failed: {}", message);
            return Ok(ConfigListing {
                success: false,
                message: Some(message),
                configs: Vec::new(),
                config_ids: Vec::new(),
                curl,
            });
        }

        let configs = match payload {
            Value::Array(items) => items,
            Value::Object(mut map) => ["uatConfigurations", "items"]
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let config_ids = configs
            .iter()
            .filter_map(|config| config.get("id").and_then(value_as_id))
            .collect::<Vec<_>>();
        info!("Found {} UAT configuration(s)", config_ids.len());
        Ok(ConfigListing {
            success: true,
            message: None,
            configs,
            config_ids,
            curl,
        })
    }

    /// Delete a UAT configuration
    pub async fn revoke(
        &self,
        config_id: &str,
        credentials: &PatCredentials,
        configs_url: &str,
    ) -> Result<RevokeOutcome, UatError> {
        let config_id = config_id.trim();
        if config_id.is_empty() {
            return Err(UatError::validation("no configuration id given"));
        }
        let url = config_url(configs_url, config_id)?;
        let session = self.login(credentials).await?;
        info!("Revoking UAT configuration {}", config_id);

        let curl = CurlCommand::new("DELETE", &url).header(SESSION_TOKEN_HEADER, session.expose());
        let request = self
            .exchange
            .http()
            .delete(&url)
            .header(SESSION_TOKEN_HEADER, session.expose());
        let reply = send(request, &url).await?;
        let success = reply.status.is_success();
        let payload = if reply.body.trim().is_empty() {
            json!({
                "status": reply.status.as_u16(),
                "message": if success {
                    format!("Configuration {} revoked", config_id)
                } else {
                    format!("Revocation of {} failed", config_id)
                },
            })
        } else {
            payload_of(&reply)
        };
        if !success {
            warn!("Revoking {} failed with HTTP {}", config_id, reply.status);
        }
        Ok(RevokeOutcome {
            success,
            status: reply.status.as_u16(),
            payload,
            curl,
        })
    }
}

/// `{configs_url}/{id}` with the id encoded as one path segment
pub fn config_url(configs_url: &str, config_id: &str) -> Result<String, UatError> {
    let mut url = url::Url::parse(configs_url)
        .map_err(|e| UatError::validation(format!("invalid URL '{}': {}", configs_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| UatError::validation(format!("URL '{}' cannot take a path", configs_url)))?
        .pop_if_empty()
        .push(config_id);
    Ok(url.to_string())
}

fn payload_of(reply: &HttpReply) -> Value {
    reply.json().unwrap_or_else(|| {
        json!({
            "status": reply.status.as_u16(),
            "body": reply.body,
        })
    })
}

fn error_message(reply: &HttpReply, payload: &Value) -> String {
    ["message", "error"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| reply.body.clone())
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = UatConfigRequest::new(
            "my-config",
            "issuer",
            "-----BEGIN PUBLIC KEY-----",
            vec!["11111111-1111-1111-1111-111111111111".to_string()],
            vec!["tableau:tcm:read".to_string()],
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["name"], "my-config");
        assert_eq!(body["publicKey"], "-----BEGIN PUBLIC KEY-----");
        assert_eq!(body["usernameClaim"], "email");
        assert_eq!(body["resourceIds"][0], "11111111-1111-1111-1111-111111111111");
        assert_eq!(body["scopes"][0], "tableau:tcm:read");
        assert_eq!(body["enabled"], true);
    }

    #[test]
    fn test_config_url() {
        assert_eq!(
            config_url("https://cm.example.com/api/v1/uat-configurations", "cfg-1").unwrap(),
            "https://cm.example.com/api/v1/uat-configurations/cfg-1"
        );
        assert_eq!(
            config_url("https://cm.example.com/api/v1/uat-configurations/", "a b").unwrap(),
            "https://cm.example.com/api/v1/uat-configurations/a%20b"
        );
        assert!(config_url("not a url", "x").is_err());
    }
}
