// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Logger
//!
//! Installs the process-wide `tracing` subscriber before any other
//! component runs, so logging is available from the first line of `main`.

/// Installs the process-wide `tracing` subscriber.
///
/// JSON output when `json` is true (production), human-readable compact
/// output otherwise (local development). The filter honors `RUST_LOG`,
/// falling back to `info` for this crate's dependency tree and `warn`
/// everywhere else.
pub fn init_tracing(json: bool, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_directive = if verbose { "devops_orchestrator=debug,devops_bootstrap=debug,warn" } else { "devops_orchestrator=info,devops_bootstrap=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }
}
