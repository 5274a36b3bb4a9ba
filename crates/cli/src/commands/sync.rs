// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::Result;
use crate::sync::SyncOutcome;

pub async fn run(ctx: &Context) -> Result<()> {
    match ctx.orchestrator.process_queue().await {
        SyncOutcome::Offline => println!("offline: nothing sent"),
        SyncOutcome::AlreadyRunning => println!("sync already running"),
        SyncOutcome::Completed { delivered, failed } => {
            println!("delivered {delivered}, failed {failed}");
        }
    }
    Ok(())
}
