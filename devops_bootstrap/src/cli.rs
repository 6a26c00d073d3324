// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse_cli()             │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `parser` - CLI structure and clap parsing
//! - `validator` - Security validation layer

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration
///
/// Holds all CLI arguments after security validation: config paths are
/// canonicalized, repository/pipeline identifiers are checked against the
/// same dangerous-pattern list used for path arguments.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

/// Validated command variants
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Serve {
        bind: Option<String>,
    },
    Migrate {
        dry_run: bool,
    },
    DiscoverWorkflows {
        repository: String,
        platform: String,
    },
    TriggerWorkflow {
        pipeline: String,
        git_ref: String,
    },
    Validate {
        config: PathBuf,
    },
}

/// Parse and validate CLI arguments
///
/// Combines parsing and validation: parse with clap, then validate every
/// path and free-form string argument before the application layer sees it.
///
/// # Errors
///
/// Returns `ParseError` if any validation fails
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parser::parse_cli();
    validate_cli(cli)
}

/// Validate parsed CLI arguments
fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = if let Some(ref path) = cli.config {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
        Some(path.clone())
    } else {
        None
    };

    let command = match cli.command {
        Commands::Serve { bind } => {
            if let Some(ref b) = bind {
                SecureArgParser::validate_argument(b)?;
            }
            ValidatedCommand::Serve { bind }
        }
        Commands::Migrate { dry_run } => ValidatedCommand::Migrate { dry_run },
        Commands::DiscoverWorkflows { repository, platform } => {
            SecureArgParser::validate_argument(&repository)?;
            SecureArgParser::validate_argument(&platform)?;
            ValidatedCommand::DiscoverWorkflows { repository, platform }
        }
        Commands::TriggerWorkflow { pipeline, git_ref } => {
            SecureArgParser::validate_argument(&pipeline)?;
            SecureArgParser::validate_argument(&git_ref)?;
            ValidatedCommand::TriggerWorkflow { pipeline, git_ref }
        }
        Commands::Validate { config } => {
            let validated_config = SecureArgParser::validate_path(&config.to_string_lossy())?;
            ValidatedCommand::Validate { config: validated_config }
        }
    };

    Ok(ValidatedCli { command, verbose: cli.verbose, config })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dangerous_repository_argument() {
        let cli = Cli::parse_from_test(Commands::DiscoverWorkflows {
            repository: "acme/widgets; rm -rf /".to_string(),
            platform: "github_actions".to_string(),
        });
        assert!(validate_cli(cli).is_err());
    }

    #[test]
    fn accepts_well_formed_trigger_workflow() {
        let cli = Cli::parse_from_test(Commands::TriggerWorkflow {
            pipeline: "github_actions:acme/widgets:ci".to_string(),
            git_ref: "main".to_string(),
        });
        let validated = validate_cli(cli).expect("should validate");
        match validated.command {
            ValidatedCommand::TriggerWorkflow { pipeline, git_ref } => {
                assert_eq!(pipeline, "github_actions:acme/widgets:ci");
                assert_eq!(git_ref, "main");
            }
            _ => panic!("expected TriggerWorkflow"),
        }
    }

    impl Cli {
        /// Test helper: build a `Cli` around a given subcommand without going
        /// through clap's process-argv parsing.
        fn parse_from_test(command: Commands) -> Self {
            Self { command, verbose: false, config: None }
        }
    }
}
