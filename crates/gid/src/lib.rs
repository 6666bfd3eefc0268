// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # GID
//!
//! A small web framework core: regex route dispatch with pass-through
//! handlers, and master/child view composition.
//!
//! ## Features
//!
//! - Route patterns like `GET|POST /posts/:id` compiled to anchored regexes
//! - Every matching route runs in order until one does not return `"pass"`
//! - Recursive view rendering with per-render variable overlays
//! - A master layout wrapped around the outermost render
//! - Stylesheet and script registries ordered by dependency
//!
//! ## Quick Start
//!
//! ```rust
//! use gid::{ActionSpec, App, AppConfig, Context, MemoryViews, Outcome, Vars};
//! use std::sync::Arc;
//!
//! let views = MemoryViews::new();
//! views.add_text("layout", "<body>{{ @content }}</body>").unwrap();
//! views.add_text("home", "<h1>{{ title or \"Home\" }}</h1>").unwrap();
//!
//! let config = AppConfig { master: Some("layout".into()), ..AppConfig::default() };
//! let mut app = App::new(config, Arc::new(views));
//! app.register("GET /", ActionSpec::parse(["site Home->index"]).unwrap()).unwrap();
//! app.pages_mut()
//!     .register_fn("site Home->index", |ctx: &mut Context, _: &[String]| {
//!         ctx.render("home", Vars::new())?;
//!         Ok(Outcome::Stop)
//!     })
//!     .unwrap();
//!
//! let response = app.handle("GET", "/").unwrap();
//! assert_eq!(response.body, "<body><h1>Home</h1></body>");
//! ```

/// Application facade.
pub mod app;
/// Stylesheet and script registries.
pub mod assets;
/// Application configuration.
pub mod config;
/// Per-request handler context.
pub mod context;
/// Dependency-ordered key lists.
pub mod dependencies;
/// Call-stack execution.
pub mod dispatch;
/// Error types and diagnostics.
pub mod error;
/// Page handlers and their registry.
pub mod handler;
/// Route pattern compilation.
pub mod pattern;
/// HTTP request abstraction.
pub mod request;
/// View lookup (filesystem, memory).
pub mod resolver;
/// HTTP response abstraction.
pub mod response;
/// Route table and call-stack construction.
pub mod router;
/// Recursive view rendering.
pub mod template;
/// View bodies and the text view format.
pub mod view;

pub use app::{App, Hook};
pub use assets::{AssetOrdering, Assets, ConditionalWrap, Placement};
pub use config::AppConfig;
pub use context::Context;
pub use dispatch::Dispatcher;
pub use error::{CallSite, GidError, Result};
pub use handler::{MethodTable, Outcome, Page, PageRegistry};
pub use pattern::RoutePattern;
pub use request::Request;
pub use resolver::{FileSystemViews, MemoryViews, ViewResolver};
pub use response::Response;
pub use router::{ActionArg, ActionSpec, CallStackEntry, HandlerRef, Route, Router};
pub use template::{ScopeRestore, TemplateEngine, Vars};
pub use view::{RenderArg, TextView, View};
