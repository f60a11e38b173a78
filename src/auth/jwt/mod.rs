// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

/// UAT claim structure
pub mod claims;

/// RS256 token signing and unverified decoding
pub mod issuer;

pub use claims::{UatClaims, DEFAULT_AUDIENCE, TENANT_ID_CLAIM};
pub use issuer::{decode_payload_json, decode_unverified, JwtIssuer, LIFETIME_RANGE};
