// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Claims carried by a Unified Access Token

use serde::{Deserialize, Serialize};

/// Name of the tenant claim expected by Tableau
pub const TENANT_ID_CLAIM: &str = "https://tableau.com/tenantId";

/// Default audience of a UAT
pub const DEFAULT_AUDIENCE: &str = "tableau";

/// UAT claims
///
/// Serialized in this field order when the token is signed. The `scp` list is
/// kept exactly as given by the caller.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UatClaims {
    /// Issuer, must match the issuer registered in the UAT configuration
    pub iss: String,

    /// Subject, the Tableau username (usually an email address)
    pub sub: String,

    /// Audience
    pub aud: String,

    /// Scopes granted by the token, in grant order
    pub scp: Vec<String>,

    /// Expiration timestamp (seconds since Unix epoch)
    pub exp: i64,

    /// Issued at timestamp (seconds since Unix epoch)
    pub iat: i64,

    /// JWT ID, a fresh UUID for every token
    pub jti: String,

    /// Cloud Manager tenant the token is valid for
    #[serde(rename = "https://tableau.com/tenantId")]
    pub tenant_id: String,
}

impl UatClaims {
    /// Lifetime of the token in seconds
    pub fn lifetime_seconds(&self) -> i64 {
        self.exp - self.iat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_claim_name() {
        let claims = UatClaims {
            iss: "issuer".to_string(),
            sub: "user@example.com".to_string(),
            aud: DEFAULT_AUDIENCE.to_string(),
            scp: vec!["tableau:content:read".to_string()],
            exp: 1_700_000_300,
            iat: 1_700_000_000,
            jti: "id".to_string(),
            tenant_id: "tenant".to_string(),
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json[TENANT_ID_CLAIM], "tenant");
        assert_eq!(claims.lifetime_seconds(), 300);
    }
}
