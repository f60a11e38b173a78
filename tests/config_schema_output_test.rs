// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_uat_config::config::{self, CONFIG_SCHEMA};

#[test]
fn test_config_schema_output() -> Result<()> {
    // Output goes to stdout, only check that it runs
    config::output_config_schema()?;
    Ok(())
}

#[test]
fn test_schema_covers_every_section() -> Result<()> {
    let schema: serde_json::Value = serde_json::from_str(CONFIG_SCHEMA)?;
    for section in ["cloud_manager", "tableau_cloud", "token", "grants"] {
        assert!(
            schema["properties"][section].is_object(),
            "schema is missing the {} section",
            section
        );
    }
    Ok(())
}
