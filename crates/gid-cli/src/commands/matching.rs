// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Request matching command.
//!
//! Shows the call stack a request would produce without running it.

use crate::config::Config;
use console::style;
use gid::{CallStackEntry, Request};

/// Computes the call stack for `method uri`.
pub fn call_stack(config: &Config, method: &str, uri: &str) -> anyhow::Result<Vec<CallStackEntry>> {
    let app = config.build_app()?;
    let request = Request::parse(method, uri, &app.config().path_prefix);
    Ok(app.router().call_stack(&request.method, &request.path))
}

/// Prints the call stack for `method uri`.
pub fn run(config: &Config, method: &str, uri: &str) -> anyhow::Result<()> {
    let stack = call_stack(config, method, uri)?;

    if stack.is_empty() {
        println!(
            "{} {} {} (would respond 404)",
            style("No route matches").yellow(),
            method,
            uri
        );
        return Ok(());
    }

    println!("{} {} {}", style("Call stack for").green(), method, uri);
    for (index, entry) in stack.iter().enumerate() {
        println!(
            "  {:>3}  {}({})  {}",
            index + 1,
            style(&entry.handler).cyan(),
            entry.args.join(", "),
            style(format!("from {}", entry.route)).dim()
        );
    }
    Ok(())
}
