// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Built-in `views` handler module.
//!
//! Lets a `gid.toml` site work without any Rust code:
//!
//! - `views View->show(view, params...)` renders `view` with the remaining
//!   arguments bound as `params` and the query string as `query`
//! - `views Log->request()` logs the request and passes
//! - `views Redirect->to(target)` redirects to an application path or an
//!   absolute URL

use gid::{Context, GidError, Outcome, Page, PageRegistry, Vars};
use serde_json::Value;

/// Name of the built-in module.
pub const MODULE: &str = "views";

/// Renders a view named by the first argument.
pub struct ViewPage;

impl Page for ViewPage {
    fn call(&mut self, method: &str, args: &[String], ctx: &mut Context) -> gid::Result<Outcome> {
        match method {
            "show" => {
                let (view, params) = match args.split_first() {
                    Some((view, params)) => (view.as_str(), params),
                    None => ("", args),
                };

                let mut vars = Vars::new();
                vars.insert(
                    "params".into(),
                    Value::Array(params.iter().cloned().map(Value::String).collect()),
                );
                let query = ctx
                    .request
                    .query
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                vars.insert("query".into(), Value::Object(query));

                ctx.render(view, vars)?;
                Ok(Outcome::Stop)
            }
            _ => Err(GidError::UnknownMethod {
                type_name: "View".into(),
                method: method.into(),
            }),
        }
    }
}

/// Registers the `views` module into `pages`.
pub fn register_builtin(pages: &mut PageRegistry) -> gid::Result<()> {
    pages.register(MODULE, "View", || ViewPage);

    pages.register_fn("views Log->request", |ctx: &mut Context, _: &[String]| {
        tracing::info!(method = %ctx.request.method, path = %ctx.request.path, uri = %ctx.request.uri, "request");
        Ok(Outcome::from(Outcome::PASS))
    })?;

    pages.register_fn("views Redirect->to", |ctx: &mut Context, args: &[String]| {
        let target = args
            .first()
            .ok_or_else(|| GidError::Config("views Redirect->to needs a target path".into()))?;
        ctx.redirect(target);
        Ok(Outcome::Stop)
    })?;

    Ok(())
}
