// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Key material, token signing and the HTTP exchanges of the UAT workflow

/// `curl` reproductions of outgoing requests
pub mod curl;

/// JWT claims and RS256 signing
pub mod jwt;

/// RSA key pair generation
pub mod keygen;

/// PAT and JWT token exchanges
pub mod session;

/// UAT configuration create, list and revoke
pub mod uat_config;

pub use curl::CurlCommand;
pub use jwt::JwtIssuer;
pub use keygen::{KeyPair, KeyPairGenerator, KeyPaths};
pub use session::{Exchange, PatCredentials, SessionExchangeClient, SessionToken};
pub use uat_config::{
    AuthorizationConfigClient, ConfigListing, RegistrationOutcome, RevokeOutcome,
    UatConfigRequest,
};
