// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "outbox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Defer API writes while offline and replay them on reconnect")]
#[command(
    long_about = "Defer API writes while offline and replay them on reconnect.\n\n\
    Mutations to mounted routes are kept in an encrypted queue until the API is reachable again."
)]
pub struct Cli {
    /// Treat the network as unreachable
    #[arg(long, global = true)]
    pub offline: bool,

    /// Config file (default: $OUTBOX_CONFIG or <config dir>/outbox/config.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a request, deferring it if offline
    #[command(after_help = "\
Examples:
  outbox send POST /api/v1/orders --body '{\"qty\": 1}'
  outbox send DELETE /api/v1/orders/42 -H 'Idempotency-Key: k-42'
  outbox send GET /api/v1/orders --timeout 3000")]
    Send {
        /// HTTP method
        #[arg(value_parser = non_empty_string)]
        method: String,

        /// URL, absolute or relative to the API base
        #[arg(value_parser = non_empty_string)]
        url: String,

        /// JSON request body
        #[arg(long, short = 'd')]
        body: Option<String>,

        /// Request header as 'Name: value' (repeatable)
        #[arg(long = "header", short = 'H', value_name = "header")]
        headers: Vec<String>,

        /// Timeout in milliseconds
        #[arg(long, value_name = "ms")]
        timeout: Option<u64>,
    },

    /// List pending requests
    List {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show connectivity and queue state
    Status,

    /// Replay pending requests now
    Sync,

    /// Replay pending requests whenever connectivity returns
    Watch {
        /// Write logs to this file instead of stderr
        #[arg(long, value_name = "path")]
        log_file: Option<PathBuf>,
    },

    /// Drop every pending request
    Clear,

    /// Show the routes writes can be deferred for
    Routes,
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
