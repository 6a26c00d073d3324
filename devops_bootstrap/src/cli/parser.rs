// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap.
//!
//! This module defines the CLI structure and handles argument parsing.
//! Security validation happens in the validator module after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug, Clone)]
#[command(name = "devops-orchestrator")]
#[command(about = concat!("DevOps Orchestrator RS v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (TOML). Defaults to ./config.toml, layered with
    /// `DEVOPS_`-prefixed environment variables.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the orchestrator HTTP server: webhook ingestion, dashboard API,
    /// websocket push, and Prometheus metrics on a single router.
    Serve {
        /// Override the configured webhook/dashboard bind address (host:port)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Apply pending relational-store migrations and exit
    Migrate {
        /// Print the migrations that would run without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Discover CI/CD workflow definitions for a tracked repository and
    /// register them with the pipeline registry
    DiscoverWorkflows {
        /// Repository in "owner/name" form
        repository: String,

        /// CI/CD platform to query (github_actions, gitlab_ci, jenkins)
        #[arg(long)]
        platform: String,
    },

    /// Manually enqueue a workflow execution, bypassing webhook ingestion
    TriggerWorkflow {
        /// Pipeline identifier (platform:repository:workflow_name)
        pipeline: String,

        /// Git ref to run against (branch, tag, or commit SHA)
        #[arg(long, default_value = "main")]
        git_ref: String,
    },

    /// Validate a configuration file without starting the server
    Validate {
        /// Configuration file to validate
        config: PathBuf,
    },
}

/// Parse CLI arguments
///
/// This is the entry point for CLI parsing. It uses clap to parse
/// arguments and returns the parsed CLI structure.
///
/// # Returns
///
/// Parsed `Cli` structure with all arguments
///
/// # Panics
///
/// Clap will exit the process with appropriate error message if parsing fails
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_bind_override() {
        let cli = Cli::parse_from(["devops-orchestrator", "serve", "--bind", "0.0.0.0:9000"]);
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.as_deref(), Some("0.0.0.0:9000")),
            _ => panic!("expected Serve command"),
        }
    }

    #[test]
    fn test_parse_trigger_workflow_defaults_git_ref_to_main() {
        let cli = Cli::parse_from(["devops-orchestrator", "trigger-workflow", "github_actions:acme/widgets:ci"]);
        match cli.command {
            Commands::TriggerWorkflow { pipeline, git_ref } => {
                assert_eq!(pipeline, "github_actions:acme/widgets:ci");
                assert_eq!(git_ref, "main");
            }
            _ => panic!("expected TriggerWorkflow command"),
        }
    }
}
