// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::SecondsFormat;
use ob_core::QueuedRequest;

use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;

pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let entries = ctx.queue.get_queue().await;
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("no pending requests");
            }
            for entry in &entries {
                println!("{}", format_entry(entry));
            }
        }
    }
    Ok(())
}

/// One line per entry: id, method, url, enqueue time.
pub(crate) fn format_entry(entry: &QueuedRequest) -> String {
    format!(
        "{}  {:<6} {}  {}",
        entry.id,
        entry.method,
        entry.url,
        entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
