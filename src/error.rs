// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error taxonomy for the UAT configuration workflow
//!
//! Every fallible library operation returns [`UatError`]. The variants map to
//! the way the workflow reacts to them:
//!
//! - [`UatError::Validation`] is recovered locally and surfaced as a status line
//! - [`UatError::Authentication`] and [`UatError::Network`] halt the workflow
//! - [`UatError::Registration`] describes a rejected control-plane request
//! - [`UatError::Signing`] and [`UatError::KeyGeneration`] are fatal for a run

use thiserror::Error;

/// Errors produced while configuring and exercising UAT access
#[derive(Error, Debug)]
pub enum UatError {
    #[error("Invalid input: {reason}")]
    Validation { reason: String },

    #[error("Authentication failed at {url} (HTTP {status}): {body}")]
    Authentication {
        url: String,
        status: u16,
        body: String,
    },

    #[error("UAT configuration request rejected: {message}")]
    Registration { message: String },

    #[error("JWT signing failed: {reason}")]
    Signing { reason: String },

    #[error("Network error calling {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("RSA key generation failed: {reason}")]
    KeyGeneration { reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

impl UatError {
    pub fn validation(reason: impl Into<String>) -> Self {
        UatError::Validation {
            reason: reason.into(),
        }
    }

    /// Build a network error from a transport failure
    ///
    /// The URL is kept for diagnostics; reqwest's own message is used as the
    /// reason because it never contains the request body.
    pub fn network(url: &str, err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            format!("request timed out ({})", err)
        } else if err.is_connect() {
            format!("connection failed ({})", err)
        } else {
            err.to_string()
        };
        UatError::Network {
            url: url.to_string(),
            reason,
        }
    }

    /// True for errors that stop a workflow run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, UatError::Validation { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            UatError::Validation { .. } => 2,
            UatError::Authentication { .. } => 3,
            UatError::Registration { .. } => 4,
            UatError::Signing { .. } => 5,
            UatError::Network { .. } => 6,
            UatError::KeyGeneration { .. } => 7,
            UatError::Config { .. } => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        let error = UatError::validation("bad luid");
        assert_eq!(error.exit_code(), 2);
        assert!(!error.is_fatal());

        let error = UatError::Authentication {
            url: "https://example.com/login".to_string(),
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(error.exit_code(), 3);
        assert!(error.is_fatal());
        assert!(error.to_string().contains("HTTP 401"));
    }
}
