// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Application facade tying routing, handlers and views together.

use crate::config::AppConfig;
use crate::context::Context;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::handler::PageRegistry;
use crate::request::Request;
use crate::resolver::ViewResolver;
use crate::response::Response;
use crate::router::{ActionSpec, Router};
use crate::template::TemplateEngine;
use std::sync::Arc;

/// A configured application.
///
/// Routing tables and handler registrations are built once at startup.
/// [`App::handle`] then only needs `&self`, so an `App` can be shared
/// across threads behind an `Arc`.
///
/// ```rust
/// use gid::{ActionSpec, App, AppConfig, Context, MemoryViews, Outcome, Vars};
/// use std::sync::Arc;
///
/// let views = MemoryViews::new();
/// views.add_text("hello", "<p>Hello {{ name }}</p>").unwrap();
///
/// let mut app = App::new(AppConfig::default(), Arc::new(views));
/// app.register("GET /hello/:name", ActionSpec::parse(["site Hello->show", "name"]).unwrap())
///     .unwrap();
/// app.pages_mut()
///     .register_fn("site Hello->show", |ctx: &mut Context, args: &[String]| {
///         ctx.template.set("name", args[0].as_str());
///         ctx.render("hello", Vars::new())?;
///         Ok(Outcome::Stop)
///     })
///     .unwrap();
///
/// let response = app.handle("GET", "/hello/world").unwrap();
/// assert_eq!(response.body, "<p>Hello world</p>");
/// ```
pub struct App {
    config: Arc<AppConfig>,
    router: Router,
    pages: PageRegistry,
    views: Arc<dyn ViewResolver>,
    on_start: Option<Hook>,
    on_end: Option<Hook>,
}

/// Per-request hook run around dispatch.
pub type Hook = Box<dyn Fn(&mut Context) -> Result<()> + Send + Sync>;

impl App {
    /// Creates an application resolving views through `views`.
    pub fn new(config: AppConfig, views: Arc<dyn ViewResolver>) -> Self {
        Self {
            config: Arc::new(config),
            router: Router::new(),
            pages: PageRegistry::new(),
            views,
            on_start: None,
            on_end: None,
        }
    }

    /// Creates an application reading views from the configured directory.
    pub fn from_config(config: AppConfig) -> Self {
        let views = Arc::new(config.file_views());
        Self::new(config, views)
    }

    /// The configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The route table.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Mutable access to the route table.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// The handler registry.
    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    /// Mutable access to the handler registry.
    pub fn pages_mut(&mut self) -> &mut PageRegistry {
        &mut self.pages
    }

    /// Registers a route (see [`Router::register`]).
    pub fn register(&mut self, definition: &str, action: ActionSpec) -> Result<()> {
        self.router.register(definition, action)
    }

    /// Sets a hook run for every request before routing.
    ///
    /// It sees the fresh context and may write to the response. An error
    /// aborts the request before any handler runs.
    pub fn on_start<F>(&mut self, hook: F)
    where
        F: Fn(&mut Context) -> Result<()> + Send + Sync + 'static,
    {
        self.on_start = Some(Box::new(hook));
    }

    /// Sets a hook run for every request after dispatch.
    ///
    /// It also runs when no route matched and when a handler failed; in the
    /// latter case the handler's error is returned.
    pub fn on_end<F>(&mut self, hook: F)
    where
        F: Fn(&mut Context) -> Result<()> + Send + Sync + 'static,
    {
        self.on_end = Some(Box::new(hook));
    }

    /// Builds a fresh request context.
    pub fn new_context(&self, request: Request) -> Context {
        let mut template = TemplateEngine::new(Arc::clone(&self.views))
            .with_scope_restore(self.config.scope_restore)
            .with_asset_ordering(self.config.asset_order);
        if let Some(master) = &self.config.master {
            template.set_master(master.as_str());
        }
        Context::new(request, template, Arc::clone(&self.config))
    }

    /// Serves one request.
    ///
    /// `uri` may carry the configured path prefix and a query string.
    /// A request matching no route gets [`Response::not_found`].
    pub fn handle(&self, method: &str, uri: &str) -> Result<Response> {
        let request = Request::parse(method, uri, &self.config.path_prefix);
        self.handle_request(request)
    }

    /// Serves an already parsed request.
    pub fn handle_request(&self, request: Request) -> Result<Response> {
        let stack = self.router.call_stack(&request.method, &request.path);
        let mut ctx = self.new_context(request);
        if let Some(hook) = &self.on_start {
            hook(&mut ctx)?;
        }

        let dispatched = if stack.is_empty() {
            tracing::debug!(method = %ctx.request.method, path = %ctx.request.path, "no route matched");
            ctx.response = Response::not_found();
            Ok(())
        } else {
            Dispatcher::new(&self.pages).run(&stack, &mut ctx).map(|executed| {
                tracing::debug!(executed, matched = stack.len(), "request dispatched");
            })
        };

        let ended = match &self.on_end {
            Some(hook) => hook(&mut ctx),
            None => Ok(()),
        };
        dispatched?;
        ended?;
        Ok(ctx.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetOrdering;
    use crate::error::GidError;
    use crate::handler::Outcome;
    use crate::resolver::MemoryViews;
    use crate::template::Vars;

    fn app(config: AppConfig) -> App {
        let views = MemoryViews::new();
        views
            .add_text("layout", "<main>{{@content}}</main>")
            .unwrap();
        views.add_text("post", "post {{ id }}").unwrap();

        let mut app = App::new(config, Arc::new(views));
        app.register("*", ActionSpec::parse(["site Log->request"]).unwrap())
            .unwrap();
        app.register("GET /posts/:id", ActionSpec::parse(["site Posts->show", "id"]).unwrap())
            .unwrap();
        app.register("GET /old", ActionSpec::parse(["site Posts->moved"]).unwrap())
            .unwrap();
        app.register("GET /broken", ActionSpec::parse(["site Missing->run"]).unwrap())
            .unwrap();

        let pages = app.pages_mut();
        pages
            .register_fn("site Log->request", |ctx: &mut Context, _: &[String]| {
                ctx.response.set_header("X-Path", ctx.request.path.clone());
                Ok(Outcome::Pass)
            })
            .unwrap();
        pages
            .register_fn("site Posts->show", |ctx: &mut Context, args: &[String]| {
                let mut vars = Vars::new();
                vars.insert("id".into(), args[0].clone().into());
                ctx.render("post", vars)?;
                Ok(Outcome::Stop)
            })
            .unwrap();
        pages
            .register_fn("site Posts->moved", |ctx: &mut Context, _: &[String]| {
                ctx.redirect("/posts/1");
                Ok(Outcome::Stop)
            })
            .unwrap();
        app
    }

    #[test]
    fn test_handle_renders_through_master() {
        let app = app(AppConfig {
            master: Some("layout".into()),
            ..AppConfig::default()
        });

        let response = app.handle("GET", "/posts/7?ref=home").unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<main>post 7</main>");
        assert_eq!(response.headers.get("x-path").map(String::as_str), Some("/posts/7"));
    }

    #[test]
    fn test_handle_strips_prefix_and_redirects() {
        let app = app(AppConfig {
            path_prefix: "blog".into(),
            ..AppConfig::default()
        });

        let response = app.handle("GET", "/blog/old").unwrap();
        assert_eq!(response.status, 302);
        assert_eq!(response.location(), Some("/blog/posts/1"));
    }

    #[test]
    fn test_catch_all_route_keeps_stack_non_empty() {
        let app = app(AppConfig::default());

        // Only the catch-all matches; it passes and nothing else runs.
        let response = app.handle("GET", "/nowhere").unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "");
    }

    #[test]
    fn test_unmatched_request_is_not_found() {
        let views = MemoryViews::new();
        let app = App::new(AppConfig::default(), Arc::new(views));
        let response = app.handle("GET", "/").unwrap();
        assert_eq!(response.status, 404);
    }

    fn styles_app(order: AssetOrdering, page: &str) -> App {
        let views = MemoryViews::new();
        views.add_text("layout", "<head>{{ @styles }}</head>{{ @content }}").unwrap();
        views.add_text("page", page).unwrap();

        let config = AppConfig {
            master: Some("layout".into()),
            asset_order: order,
            ..AppConfig::default()
        };
        let mut app = App::new(config, Arc::new(views));
        app.register("GET /", ActionSpec::parse(["site Page->show"]).unwrap())
            .unwrap();
        app.pages_mut()
            .register_fn("site Page->show", |ctx: &mut Context, _: &[String]| {
                ctx.render("page", Vars::new())?;
                Ok(Outcome::Stop)
            })
            .unwrap();
        app
    }

    const LATE_DEPENDENCY: &str = "{{ @style core /core.css }}\
                                   {{ @style app /app.css after=lib }}\
                                   {{ @style lib /lib.css after=core }}body";

    fn stylesheet_order(body: &str) -> Vec<&str> {
        ["/core.css", "/lib.css", "/app.css"]
            .into_iter()
            .filter_map(|url| body.find(url).map(|at| (at, url)))
            .collect::<std::collections::BTreeMap<_, _>>()
            .into_values()
            .collect()
    }

    #[test]
    fn test_greedy_asset_order_through_app() {
        let app = styles_app(AssetOrdering::Greedy, LATE_DEPENDENCY);
        let response = app.handle("GET", "/").unwrap();
        assert_eq!(stylesheet_order(&response.body), vec!["/app.css", "/core.css", "/lib.css"]);
    }

    #[test]
    fn test_topological_asset_order_through_app() {
        let app = styles_app(AssetOrdering::Topological, LATE_DEPENDENCY);
        let response = app.handle("GET", "/").unwrap();
        assert_eq!(stylesheet_order(&response.body), vec!["/core.css", "/lib.css", "/app.css"]);
        assert!(response.body.ends_with("</head>body"));
    }

    #[test]
    fn test_asset_cycle_in_master_fails_the_request() {
        let app = styles_app(
            AssetOrdering::Topological,
            "{{ @style a /a.css after=b }}{{ @style b /b.css after=a }}body",
        );
        let err = app.handle("GET", "/").unwrap_err();
        assert!(matches!(err, GidError::DependencyCycle(_)));
    }

    #[test]
    fn test_percent_encoded_paths_match_routes() {
        let views = MemoryViews::new();
        let mut app = App::new(AppConfig::default(), Arc::new(views));
        app.register("GET /café", ActionSpec::parse(["site Echo->path"]).unwrap())
            .unwrap();
        app.register("GET /tag/:t", ActionSpec::parse(["site Echo->path", "t"]).unwrap())
            .unwrap();
        app.pages_mut()
            .register_fn("site Echo->path", |ctx: &mut Context, args: &[String]| {
                let text = format!("{}|{}", ctx.request.path, args.join(","));
                ctx.response.write(&text);
                Ok(Outcome::Stop)
            })
            .unwrap();

        let response = app.handle("GET", "/caf%C3%A9").unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "/café|");

        let response = app.handle("GET", "/tag/a%2Db").unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "/tag/a-b|a-b");
    }

    #[test]
    fn test_start_and_end_hooks_wrap_every_request() {
        let mut app = app(AppConfig::default());
        app.on_start(|ctx: &mut Context| {
            ctx.response.write("[");
            ctx.template.set("greeting", "hi");
            Ok(())
        });
        app.on_end(|ctx: &mut Context| {
            ctx.response.write("]");
            Ok(())
        });
        app.register("GET /greet", ActionSpec::parse(["site Greet->show"]).unwrap())
            .unwrap();
        app.pages_mut()
            .register_fn("site Greet->show", |ctx: &mut Context, _: &[String]| {
                let text = ctx.template.out("greeting", "none");
                ctx.response.write(&text);
                Ok(Outcome::Stop)
            })
            .unwrap();

        assert_eq!(app.handle("GET", "/greet").unwrap().body, "[hi]");

        let response = app.handle("GET", "/posts/1").unwrap();
        assert_eq!(response.body, "[post 1]");
    }

    #[test]
    fn test_end_hook_runs_on_unmatched_and_failed_requests() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let ended = Arc::new(AtomicUsize::new(0));
        let mut app = app(AppConfig::default());
        let counter = Arc::clone(&ended);
        app.on_end(move |_: &mut Context| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let views = MemoryViews::new();
        let mut empty = App::new(AppConfig::default(), Arc::new(views));
        let counter = Arc::clone(&ended);
        empty.on_end(move |_: &mut Context| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(empty.handle("GET", "/").unwrap().status, 404);
        assert!(matches!(
            app.handle("GET", "/broken").unwrap_err(),
            GidError::UnknownType { .. }
        ));
        assert_eq!(ended.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_start_hook_error_skips_dispatch() {
        let mut app = app(AppConfig::default());
        app.on_start(|_: &mut Context| Err(GidError::Config("maintenance".into())));
        assert!(matches!(app.handle("GET", "/posts/1"), Err(GidError::Config(_))));
    }

    #[test]
    fn test_resolution_failure_is_returned() {
        let app = app(AppConfig::default());
        let err = app.handle("GET", "/broken").unwrap_err();
        assert!(matches!(err, GidError::UnknownType { .. }));
    }
}
