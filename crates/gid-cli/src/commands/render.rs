// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Offline render command.
//!
//! Renders one view through the configured master layout and prints the
//! result, which is handy for checking view files without a server.

use crate::config::Config;
use anyhow::bail;
use gid::{Request, Vars};
use serde_json::Value;

/// Parses a `key=value` pair. Values that are valid JSON are kept as JSON,
/// anything else becomes a string.
pub fn parse_var(pair: &str) -> anyhow::Result<(String, Value)> {
    let Some((key, raw)) = pair.split_once('=') else {
        bail!("Expected key=value, got {:?}", pair);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Empty variable name in {:?}", pair);
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Renders `view` with `vars` and returns the markup.
pub fn render(config: &Config, view: &str, vars: &[String]) -> anyhow::Result<String> {
    let app = config.build_app()?;
    let mut ctx = app.new_context(Request::new("GET", "/"));

    let mut extra = Vars::new();
    for pair in vars {
        let (key, value) = parse_var(pair)?;
        extra.insert(key, value);
    }

    Ok(ctx.template.render(view, extra)?)
}

/// Runs the render command.
pub fn run(config: &Config, view: &str, vars: &[String]) -> anyhow::Result<()> {
    let html = render(config, view, vars)?;
    println!("{}", html);
    Ok(())
}
