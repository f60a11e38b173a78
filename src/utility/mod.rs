// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Utility module for helpers built on top of workflow results

pub mod api_testing;

pub use api_testing::{
    test_content_connection, test_tcm_connection, update_curl_commands, CurlCommands,
};
