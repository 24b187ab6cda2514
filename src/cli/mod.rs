//! # Command Line Interface
//!
//! Operator tooling for inspecting SVID classification, the effective
//! configuration and request bodies.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

use crate::audit::AuditEvent;
use crate::config::{Config, ObservabilityConfig};
use crate::identity::{IdentityClassifier, TrustRole};
use crate::observability::init_logging;
use crate::reqres::{
    decode, Contract, GenericRequest, GenericResponse, SecretFetchRequest,
    SecretFetchResponse, SecretListRequest, SecretListResponse, SecretUpsertRequest,
    SecretUpsertResponse,
};

#[derive(Parser, Debug)]
#[command(name = "aegis")]
#[command(about = "Aegis identity and audit tooling")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show the trust roles an SVID holds
    Classify {
        /// SPIFFE ID to classify
        svid: String,
    },

    /// Print the effective configuration as JSON
    Config,

    /// Validate the configuration from the environment
    Validate,

    /// Decode a request or response body and show the audit event it yields
    Decode {
        /// Contract to decode against
        #[arg(value_enum)]
        kind: ContractKind,

        /// Read the body from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractKind {
    UpsertRequest,
    UpsertResponse,
    FetchRequest,
    FetchResponse,
    ListRequest,
    ListResponse,
    GenericRequest,
    GenericResponse,
}

/// Classification result printed by `aegis classify`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ClassifyReport<'a> {
    pub svid: &'a str,
    pub roles: Vec<TrustRole>,
    pub primary_role: Option<TrustRole>,
    pub workload_id: Option<&'a str>,
}

/// Decoding result printed by `aegis decode`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DecodeReport {
    pub kind: &'static str,
    pub valid: bool,
    pub event: AuditEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run CLI commands
pub fn run_cli() -> anyhow::Result<()> {
    // A missing .env file is fine; anything else is worth a warning.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let config = Config::from_env();
    initialise_logging(config.as_ref().ok(), cli.verbose)?;

    match cli.command {
        Commands::Classify { svid } => {
            let config = config?;
            let classifier = config.classifier();
            print_json(&classify(&classifier, &svid))
        }
        Commands::Config => print_json(&config?),
        Commands::Validate => {
            config.context("Configuration is invalid")?;
            println!("Configuration is valid");
            Ok(())
        }
        Commands::Decode { kind, file } => {
            let body = read_body(file)?;
            let report = decode_report(kind, &body);
            print_json(&report)?;
            if !report.valid {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn initialise_logging(config: Option<&Config>, verbose: bool) -> anyhow::Result<()> {
    let mut observability = config
        .map(|config| config.observability.clone())
        .unwrap_or_else(ObservabilityConfig::default);
    if verbose {
        observability.log_level = "debug".to_string();
    }

    // A subscriber may already be installed (e.g. in integration tests).
    init_logging(&observability)?;
    Ok(())
}

/// Build the classification report for an SVID
pub fn classify<'a>(classifier: &IdentityClassifier, svid: &'a str) -> ClassifyReport<'a> {
    ClassifyReport {
        svid,
        roles: classifier.roles(svid),
        primary_role: classifier.primary_role(svid),
        workload_id: if classifier.is_workload(svid) { classifier.workload_id(svid) } else { None },
    }
}

/// Decode `body` as `kind` and report the audit event a service would record
pub fn decode_report(kind: ContractKind, body: &[u8]) -> DecodeReport {
    match kind {
        ContractKind::UpsertRequest => report::<SecretUpsertRequest>(body),
        ContractKind::UpsertResponse => report::<SecretUpsertResponse>(body),
        ContractKind::FetchRequest => report::<SecretFetchRequest>(body),
        ContractKind::FetchResponse => report::<SecretFetchResponse>(body),
        ContractKind::ListRequest => report::<SecretListRequest>(body),
        ContractKind::ListResponse => report::<SecretListResponse>(body),
        ContractKind::GenericRequest => report::<GenericRequest>(body),
        ContractKind::GenericResponse => report::<GenericResponse>(body),
    }
}

fn report<T: Contract>(body: &[u8]) -> DecodeReport {
    match decode::<T>(body) {
        Ok(_) => DecodeReport { kind: T::KIND, valid: true, event: AuditEvent::Success, error: None },
        Err(e) => DecodeReport {
            kind: T::KIND,
            valid: false,
            event: e.audit_event(),
            error: Some(e.to_string()),
        },
    }
}

fn read_body(file: Option<PathBuf>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => std::fs::read(&path)
            .with_context(|| format!("Failed to read body from {}", path.display())),
        None => {
            let mut body = Vec::new();
            std::io::stdin().read_to_end(&mut body).context("Failed to read body from stdin")?;
            Ok(body)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
