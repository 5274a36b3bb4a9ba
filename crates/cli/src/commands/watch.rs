// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::Result;

/// Replays the queue on every reconnect until Ctrl-C.
pub async fn run(ctx: &Context) -> Result<()> {
    let listening = ctx.observer.start_listening();
    ctx.orchestrator.start_sync();

    // A reconnect only fires on a transition, so drain what is already
    // pending if we start online.
    if ctx.observer.is_online() {
        let outcome = ctx.orchestrator.process_queue().await;
        tracing::info!(?outcome, "initial sync pass finished");
    }

    tracing::info!(
        pending = ctx.queue.len().await,
        "watching for connectivity changes"
    );
    tokio::signal::ctrl_c().await?;

    ctx.orchestrator.stop_sync();
    listening.stop();
    tracing::info!("stopped watching");
    Ok(())
}
