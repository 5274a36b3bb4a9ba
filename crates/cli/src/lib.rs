// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! outbox - defer API writes while offline and replay them on reconnect.
//!
//! This crate provides the runtime behind the `outbox` CLI: the encrypted
//! offline queue, connectivity tracking, the gateway that decides whether a
//! write is deferred, and the orchestrator that replays deferred writes.
//!
//! # Main Components
//!
//! - [`sync::RequestGateway`] - queues eligible writes while offline
//! - [`sync::OfflineQueue`] - encrypted, persistent FIFO of deferred writes
//! - [`sync::ConnectivityObserver`] - online/offline state with change listeners
//! - [`sync::SyncOrchestrator`] - replays the queue on reconnect
//! - [`Config`] - API location, probing and the route manifest
//!
//! # Wiring
//!
//! ```rust,ignore
//! use outbox::commands::Context;
//!
//! let config = Config::load(&config::config_path(None))?;
//! let ctx = Context::open(config, &config::state_dir(), false).await?;
//! if !ctx.gateway.queue_request_if_offline(&request).await? {
//!     ctx.executor.send(&request).await?;
//! }
//! ```

mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod storage;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};
pub use storage::FileStore;

use commands::Context;

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&config::config_path(cli.config.as_deref()))?;

    // Listing routes needs neither the queue nor the network.
    if let Command::Routes = cli.command {
        return commands::routes::run(&config);
    }

    let ctx = Context::open(config, &config::state_dir(), cli.offline).await?;
    match cli.command {
        Command::Send {
            method,
            url,
            body,
            headers,
            timeout,
        } => commands::send::run(&ctx, method, url, body, headers, timeout).await,
        Command::List { output } => commands::list::run(&ctx, output).await,
        Command::Status => commands::status::run(&ctx),
        Command::Sync => commands::sync::run(&ctx).await,
        Command::Watch { .. } => commands::watch::run(&ctx).await,
        Command::Clear => commands::clear::run(&ctx).await,
        Command::Routes => commands::routes::run(&ctx.config),
    }
}
