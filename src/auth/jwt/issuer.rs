// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! RS256 signer for Unified Access Tokens
//!
//! The issuer holds the private key of the generated key pair and signs one
//! token per call. Tokens are never stored; the caller forwards the returned
//! string to the exchange endpoints.
//!
//! # Example Usage
//!
//! ```no_run
//! use rust_uat_config::auth::jwt::JwtIssuer;
//! use rust_uat_config::auth::keygen::KeyPairGenerator;
//!
//! let key_pair = KeyPairGenerator::new("keys").generate()?;
//! let issuer = JwtIssuer::from_key_pair(&key_pair)?;
//! let token = issuer.build(
//!     "my-issuer",
//!     5,
//!     "11111111-1111-1111-1111-111111111111",
//!     "user@example.com",
//!     &["tableau:content:read".to_string()],
//! )?;
//! # Ok::<(), rust_uat_config::error::UatError>(())
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use uuid::Uuid;

use super::claims::{UatClaims, DEFAULT_AUDIENCE};
use crate::auth::keygen::KeyPair;
use crate::error::UatError;

/// Accepted token lifetimes in minutes
pub const LIFETIME_RANGE: std::ops::RangeInclusive<i64> = 1..=60;

/// Signs UAT JWTs with an RSA private key
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    audience: String,
    key_id: Option<String>,
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("algorithm", &Algorithm::RS256)
            .field("encoding_key", &"<EncodingKey>")
            .field("audience", &self.audience)
            .field("key_id", &self.key_id)
            .finish()
    }
}

impl JwtIssuer {
    /// Create an issuer from a PEM encoded RSA private key (PKCS#1 or PKCS#8)
    pub fn from_pem(private_key_pem: &[u8]) -> Result<Self, UatError> {
        if private_key_pem.is_empty() {
            return Err(UatError::Signing {
                reason: "private key is empty".to_string(),
            });
        }
        let encoding_key =
            EncodingKey::from_rsa_pem(private_key_pem).map_err(|e| UatError::Signing {
                reason: format!("invalid RSA private key: {}", e),
            })?;
        Ok(Self {
            encoding_key,
            audience: DEFAULT_AUDIENCE.to_string(),
            key_id: None,
        })
    }

    pub fn from_key_pair(key_pair: &KeyPair) -> Result<Self, UatError> {
        Self::from_pem(key_pair.private_key_pem())
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Set the `kid` header
    pub fn with_key_id(mut self, key_id: Option<String>) -> Self {
        self.key_id = key_id;
        self
    }

    /// Build and sign a token
    ///
    /// `scopes` end up in the `scp` claim unchanged, in the same order and
    /// with duplicates kept. Every call gets a fresh `jti`.
    pub fn build(
        &self,
        issuer: &str,
        lifetime_minutes: i64,
        tenant_id: &str,
        subject: &str,
        scopes: &[String],
    ) -> Result<String, UatError> {
        if !LIFETIME_RANGE.contains(&lifetime_minutes) {
            return Err(UatError::validation(format!(
                "JWT lifetime must be between {} and {} minutes, got {}",
                LIFETIME_RANGE.start(),
                LIFETIME_RANGE.end(),
                lifetime_minutes
            )));
        }

        let now = Utc::now().timestamp();
        let claims = UatClaims {
            iss: issuer.to_string(),
            sub: subject.to_string(),
            aud: self.audience.clone(),
            scp: scopes.to_vec(),
            exp: now + lifetime_minutes * 60,
            iat: now,
            jti: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let token = encode(&header, &claims, &self.encoding_key).map_err(|e| {
            UatError::Signing {
                reason: e.to_string(),
            }
        })?;
        debug!(
            "Signed JWT jti={} with {} scope(s), valid for {} minute(s)",
            claims.jti,
            claims.scp.len(),
            lifetime_minutes
        );
        Ok(token)
    }
}

/// Decode the payload of a JWT without checking its signature
///
/// Used for operator diagnostics only.
pub fn decode_unverified(token: &str) -> Result<UatClaims, UatError> {
    serde_json::from_slice(&payload_bytes(token)?)
        .map_err(|e| UatError::validation(format!("JWT payload is not valid claims: {}", e)))
}

/// Same as [`decode_unverified`], keeping the payload as raw JSON
pub fn decode_payload_json(token: &str) -> Result<serde_json::Value, UatError> {
    serde_json::from_slice(&payload_bytes(token)?)
        .map_err(|e| UatError::validation(format!("JWT payload is not JSON: {}", e)))
}

fn payload_bytes(token: &str) -> Result<Vec<u8>, UatError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| UatError::validation("token is not a JWT"))?;
    URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| UatError::validation(format!("JWT payload is not base64url: {}", e)))
}
