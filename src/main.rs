// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Command line front-end of the UAT configuration tool

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use log::{error, info};

use rust_uat_config::auth::{AuthorizationConfigClient, SessionExchangeClient};
use rust_uat_config::config::{self, Config, DEFAULT_CONFIG_FILE};
use rust_uat_config::utility::{
    test_content_connection, test_tcm_connection, update_curl_commands,
};
use rust_uat_config::workflow::{Workflow, WorkflowResults, WorkflowStep};
use rust_uat_config::{scopes, UatError};

/// Tableau Unified Access Token configuration tool
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Cloud Manager tenant id
    #[arg(long, global = true)]
    tenant_id: Option<String>,

    /// Cloud Manager PAT secret
    #[arg(long, env = "UAT_PAT_SECRET", hide_env_values = true, global = true)]
    pat_secret: Option<String>,

    /// Tableau Cloud pod URL
    #[arg(long, global = true)]
    pod_url: Option<String>,

    /// Tableau username (JWT subject)
    #[arg(long, global = true)]
    username: Option<String>,

    /// JWT issuer
    #[arg(long, global = true)]
    issuer: Option<String>,

    /// JWT lifetime in minutes (1-60)
    #[arg(long, global = true)]
    lifetime: Option<i64>,

    /// Name of the UAT configuration to create
    #[arg(long, global = true)]
    config_name: Option<String>,

    /// Output directory for the generated key pair
    #[arg(long, global = true)]
    key_dir: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the complete UAT workflow
    Run {
        /// Write the final results as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the UAT configurations of the tenant
    List,
    /// Revoke a UAT configuration
    Revoke {
        /// Id of the configuration to delete
        id: String,
    },
    /// Log into Cloud Manager again with the JWT of a previous run
    TestTcm {
        /// Results JSON written by `run --output`
        #[arg(long)]
        results: PathBuf,
    },
    /// Sign into Tableau Cloud again with the JWT of a previous run
    TestContent {
        /// Results JSON written by `run --output`
        #[arg(long)]
        results: PathBuf,

        /// Site content URL, defaults to the site used by the run
        #[arg(long)]
        site: Option<String>,
    },
    /// Show the catalogue of known scopes
    Scopes {
        /// Only show one family (e.g. `projects` or `tableau:projects`)
        family: Option<String>,
    },
    /// Show the configured grants
    Summary,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Err(err) = run(args).await {
        error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        let code = err
            .downcast_ref::<UatError>()
            .map(UatError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(args: Args) -> Result<()> {
    if args.show_config_schema {
        return config::output_config_schema();
    }

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    if let Command::Scopes { family } = &command {
        return print_scopes(family.as_deref());
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = Config::from_file(&config_path)?;
    config.apply_args(
        args.tenant_id,
        args.pat_secret,
        args.pod_url,
        args.username,
        args.issuer,
        args.lifetime,
        args.config_name,
        args.key_dir,
    );
    config::validate_specific_rules(&config)?;

    let client = SessionExchangeClient::new(config.http_timeout())?;

    match command {
        Command::Run { output } => run_workflow(&config, client, output).await,
        Command::List => {
            config.ensure_pat_secret()?;
            let listing = AuthorizationConfigClient::new(client)
                .list(
                    &config.cloud_manager.credentials(),
                    &config.cloud_manager.uat_configs_url,
                )
                .await?;
            println!("{}", listing.curl);
            if !listing.success {
                return Err(UatError::Registration {
                    message: listing.message.unwrap_or_default(),
                }
                .into());
            }
            println!("{}", serde_json::to_string_pretty(&listing.configs)?);
            println!("Configuration ids: {}", listing.config_ids.join(", "));
            Ok(())
        }
        Command::Revoke { id } => {
            config.ensure_pat_secret()?;
            let outcome = AuthorizationConfigClient::new(client)
                .revoke(
                    &id,
                    &config.cloud_manager.credentials(),
                    &config.cloud_manager.uat_configs_url,
                )
                .await?;
            println!("{}", outcome.curl);
            println!("{}", serde_json::to_string_pretty(&outcome.payload)?);
            if outcome.success {
                Ok(())
            } else {
                Err(UatError::Registration {
                    message: format!("revocation of {} failed (HTTP {})", id, outcome.status),
                }
                .into())
            }
        }
        Command::TestTcm { results } => {
            let results = read_results(&results)?;
            println!(
                "{}",
                test_tcm_connection(&client, &config.cloud_manager.jwt_login_url, &results).await
            );
            Ok(())
        }
        Command::TestContent { results, site } => {
            let results = read_results(&results)?;
            println!(
                "{}",
                test_content_connection(
                    &client,
                    &config.tableau_cloud.pod_url,
                    &config.tableau_cloud.api_version,
                    site.as_deref(),
                    &results,
                )
                .await
            );
            Ok(())
        }
        Command::Summary => {
            let (session, rejected) = config.grants.to_session();
            for status in &rejected {
                println!("{}", status);
            }
            println!("{}", session.render_summary());
            Ok(())
        }
        Command::Scopes { .. } => Ok(()),
    }
}

async fn run_workflow(
    config: &Config,
    client: SessionExchangeClient,
    output: Option<PathBuf>,
) -> Result<()> {
    config.ensure_workflow_ready()?;
    let (grants, rejected) = config.grants.to_session();
    for status in &rejected {
        println!("{}", status);
    }
    info!(
        "Starting UAT workflow with {} resource grant(s)",
        grants.resource_ids().len()
    );

    let mut workflow = Workflow::new(config.workflow_settings(), &grants, client);
    let mut last_results = WorkflowResults::default();
    while let Some(event) = workflow.next_event().await {
        println!("{}", event.message);
        if event.step == WorkflowStep::KeyGen {
            if let Some(paths) = &event.key_paths {
                println!("   private key: {}", paths.private_key_path.display());
                println!("   public key:  {}", paths.public_key_path.display());
            }
        }
        last_results = event.results;
    }

    let curls = update_curl_commands(&last_results);
    println!("\nTCM login:\n{}", curls.tcm);
    println!("\nTableau Cloud sign-in:\n{}", curls.tableau);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&last_results)
            .context("Failed to serialize workflow results")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write results to {:?}", path))?;
        println!("\nResults written to {}", path.display());
    }

    match workflow.take_error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn read_results(path: &Path) -> Result<WorkflowResults> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file at {:?}", path))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse workflow results from {:?}", path))
}

fn print_scopes(family: Option<&str>) -> Result<()> {
    let definitions: Vec<_> = match family {
        Some(name) => vec![scopes::find(name).ok_or_else(|| {
            UatError::validation(format!("unknown scope family '{}'", name))
        })?],
        None => scopes::SCOPE_DEFINITIONS.iter().collect(),
    };
    for definition in definitions {
        println!("{} ({})", definition.prefix, definition.key);
        println!("    {}", definition.description);
        for scope in definition.scopes() {
            println!("    - {}", scope);
        }
    }
    if family.is_none() {
        println!();
        println!("Common actions: {}", scopes::COMMON_ACTIONS.join(", "));
    }
    Ok(())
}
