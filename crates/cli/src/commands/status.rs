// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::SecondsFormat;

use super::Context;
use crate::error::Result;
use crate::sync::Hydration;

pub fn run(ctx: &Context) -> Result<()> {
    println!("{}", render(ctx.observer.is_online(), &ctx.hydration));
    Ok(())
}

pub(crate) fn render(online: bool, hydration: &Hydration) -> String {
    let mut out = String::from(if online { "online" } else { "offline" });
    out.push_str(&format!("\npending: {}", hydration.pending()));
    if let Some(oldest) = hydration.oldest() {
        out.push_str(&format!(
            "\noldest: {}",
            oldest.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    out
}
