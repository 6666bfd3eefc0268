// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route listing command.

use crate::config::Config;
use console::style;
use gid::{ActionArg, Route};

/// Prints every configured route in registration order.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let app = config.build_app()?;
    let routes = app.router().routes();

    if routes.is_empty() {
        println!("{}", style("No routes configured").yellow());
        return Ok(());
    }

    println!("{} {} route(s)", style("Found").green(), routes.len());
    for (index, route) in routes.iter().enumerate() {
        println!(
            "  {:>3}  {}  {}",
            index + 1,
            style(route.pattern.definition()).cyan(),
            describe(route)
        );
        println!("       {}", style(route.pattern.as_str()).dim());
    }
    Ok(())
}

/// One-line description of a route's action, e.g. `views View->show(user, :id)`.
pub fn describe(route: &Route) -> String {
    let args: Vec<String> = route
        .args
        .iter()
        .map(|arg| match arg {
            ActionArg::Literal(text) => text.clone(),
            ActionArg::Capture(name) => format!(":{}", name),
        })
        .collect();

    format!("{}({})", route.handler, args.join(", "))
}
