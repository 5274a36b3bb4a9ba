// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::{Error, Result};

pub async fn run(ctx: &Context) -> Result<()> {
    let pending = ctx.queue.len().await;
    if !ctx.queue.clear_queue().await {
        return Err(Error::ClearFailed);
    }
    println!("cleared {pending} pending requests");
    Ok(())
}
