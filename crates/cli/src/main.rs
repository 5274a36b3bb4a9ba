// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fs;
use std::path::Path;

use clap::Parser;
use outbox::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    match &cli.command {
        Command::Watch { log_file } => setup_logging("info", log_file.as_deref()),
        _ => setup_logging("warn", None),
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: tokio: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(outbox::run(cli)) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(default_level: &str, log_path: Option<&Path>) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Try to open log file, fall back to stderr
    if let Some(file) = log_path.and_then(|path| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    }) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
