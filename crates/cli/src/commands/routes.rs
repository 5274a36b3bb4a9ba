// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::Config;
use crate::error::Result;

pub fn run(config: &Config) -> Result<()> {
    println!("{}", render(config)?);
    Ok(())
}

/// Lists the mounted segments, then the manifest it came from.
pub(crate) fn render(config: &Config) -> Result<String> {
    let contract = config.contract()?;
    let prefix = if contract.prefix().is_empty() {
        "/"
    } else {
        contract.prefix()
    };

    if contract.segments().is_empty() {
        return Ok(format!(
            "prefix: {prefix}\nno routes mounted: nothing can be deferred while offline"
        ));
    }

    let mut out = format!("prefix: {prefix}\nmounted:");
    for segment in contract.segments().iter() {
        out.push_str(&format!("\n  {segment}"));
    }
    out.push_str("\nroutes:");
    for route in &config.routes {
        out.push_str(&format!(
            "\n  {:<6} {}",
            route.method.trim().to_ascii_uppercase(),
            route.path
        ));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
