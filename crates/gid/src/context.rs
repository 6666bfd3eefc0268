// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Per-request context handed to page handlers.

use crate::config::AppConfig;
use crate::error::{CallSite, Result};
use crate::request::Request;
use crate::response::Response;
use crate::template::{TemplateEngine, Vars};
use std::sync::Arc;

/// Everything a handler can touch while serving one request.
///
/// A context is created per request and never shared, so the view state
/// inside [`TemplateEngine`] cannot leak between requests.
pub struct Context {
    /// The incoming request.
    pub request: Request,
    /// View state for this request.
    pub template: TemplateEngine,
    /// The response being built.
    pub response: Response,
    config: Arc<AppConfig>,
}

impl Context {
    /// Creates a context.
    pub fn new(request: Request, template: TemplateEngine, config: Arc<AppConfig>) -> Self {
        Self {
            request,
            template,
            response: Response::default(),
            config,
        }
    }

    /// The application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Renders `view` and appends the result to the response body.
    #[track_caller]
    pub fn render(&mut self, view: &str, extra: Vars) -> Result<()> {
        let site = CallSite::caller();
        let html = self.template.render_at(view, extra, site)?;
        self.response.write(&html);
        Ok(())
    }

    /// Builds a URL for an application path (see [`AppConfig::url`]).
    pub fn url(&self, path: &str, include_domain: bool) -> String {
        self.config.url(path, include_domain)
    }

    /// Redirects to `target`.
    ///
    /// Absolute URLs (`scheme://...` or `//host/...`) are sent as given;
    /// anything else is treated as an application path and goes through
    /// [`url`](Self::url).
    pub fn redirect(&mut self, target: &str) {
        let location = if is_absolute_url(target) {
            target.to_string()
        } else {
            self.url(target, true)
        };
        self.response.set_redirect(location);
    }

    #[cfg(test)]
    pub(crate) fn for_test(method: &str, path: &str) -> Self {
        let views = crate::resolver::MemoryViews::new();
        Self::new(
            Request::new(method, path),
            TemplateEngine::new(Arc::new(views)),
            Arc::new(AppConfig::default()),
        )
    }
}

fn is_absolute_url(target: &str) -> bool {
    if target.starts_with("//") {
        return true;
    }
    match target.split_once("://") {
        Some((scheme, _)) => {
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_uses_prefix() {
        let config = AppConfig {
            path_prefix: "app".into(),
            ..AppConfig::default()
        };
        let views = crate::resolver::MemoryViews::new();
        let mut ctx = Context::new(
            Request::new("GET", "/"),
            TemplateEngine::new(Arc::new(views)),
            Arc::new(config),
        );

        ctx.redirect("/login");
        assert_eq!(ctx.response.location(), Some("/app/login"));
    }

    #[test]
    fn test_redirect_to_absolute_url_is_unchanged() {
        let config = AppConfig {
            domain: Some("example.com".into()),
            path_prefix: "app".into(),
            ..AppConfig::default()
        };
        let views = crate::resolver::MemoryViews::new();
        let mut ctx = Context::new(
            Request::new("GET", "/"),
            TemplateEngine::new(Arc::new(views)),
            Arc::new(config),
        );

        ctx.redirect("https://example.org/login");
        assert_eq!(ctx.response.location(), Some("https://example.org/login"));

        ctx.redirect("//cdn.example.org/x");
        assert_eq!(ctx.response.location(), Some("//cdn.example.org/x"));

        ctx.redirect("/login?next=http://x");
        assert_eq!(ctx.response.location(), Some("http://example.com/app/login?next=http://x"));
    }

    #[test]
    fn test_render_appends_to_body() {
        let views = crate::resolver::MemoryViews::new();
        views.add_text("hello", "Hello {{ who }}").unwrap();
        let mut ctx = Context::new(
            Request::new("GET", "/"),
            TemplateEngine::new(Arc::new(views)),
            Arc::new(AppConfig::default()),
        );
        ctx.template.set("who", "there");

        ctx.render("hello", Vars::new()).unwrap();
        ctx.render("", Vars::new()).unwrap();
        assert!(ctx.response.body.starts_with("Hello there<div class=\"gid-error\">"));
    }
}
