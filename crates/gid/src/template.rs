// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Recursive master/child view rendering.
//!
//! A [`TemplateEngine`] holds the per-request view state: variables, the
//! master layout name, the content of the outermost render, the render
//! depth and the asset registries.
//!
//! # Render Algorithm
//!
//! 1. Empty view names and unknown views abort the render (see below)
//! 2. Extra variables are overlaid on the variable map
//! 3. The view body runs with the depth counter incremented; it may render
//!    other views recursively
//! 4. Overlaid variables are restored according to [`ScopeRestore`]
//! 5. At depth 1 the body output becomes the content and the master view
//!    is rendered in its place; deeper renders return their output inline
//!
//! Aborted renders never touch the depth counter. [`TemplateEngine::render`]
//! turns them into an inline HTML diagnostic that names the call site;
//! [`TemplateEngine::try_render`] returns them as errors instead.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gid::{MemoryViews, TemplateEngine, Vars};
//!
//! let views = MemoryViews::new();
//! views.add_text("layout", "<main>{{ @content }}</main>").unwrap();
//! views.add_text("hello", "Hello {{ name }}").unwrap();
//!
//! let mut engine = TemplateEngine::new(Arc::new(views));
//! engine.set_master("layout");
//! engine.set("name", "World");
//!
//! let html = engine.render("hello", Vars::new()).unwrap();
//! assert_eq!(html, "<main>Hello World</main>");
//! ```

use crate::assets::{AssetOrdering, Assets, ConditionalWrap, Placement};
use crate::error::{CallSite, GidError, Result};
use crate::resolver::ViewResolver;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Extra variables passed to a render.
pub type Vars = serde_json::Map<String, Value>;

/// How overlaid variables are restored after a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeRestore {
    /// Keys that existed before the render get their old value back; keys
    /// introduced by the overlay stay set and are visible to later renders.
    #[default]
    Overlaid,
    /// Overlaid keys are put back exactly: previous values restored and
    /// newly introduced keys removed. Variables the view body sets itself
    /// are kept.
    Strict,
}

/// Per-request view state and renderer.
pub struct TemplateEngine {
    views: Arc<dyn ViewResolver>,
    vars: HashMap<String, Value>,
    master: Option<String>,
    content: String,
    depth: usize,
    scope: ScopeRestore,
    assets: Assets,
}

impl TemplateEngine {
    /// Creates an engine resolving views through `views`.
    pub fn new(views: Arc<dyn ViewResolver>) -> Self {
        Self {
            views,
            vars: HashMap::new(),
            master: None,
            content: String::new(),
            depth: 0,
            scope: ScopeRestore::default(),
            assets: Assets::default(),
        }
    }

    /// Sets the variable restore policy.
    pub fn with_scope_restore(mut self, scope: ScopeRestore) -> Self {
        self.scope = scope;
        self
    }

    /// Sets how assets are ordered at emission time.
    pub fn with_asset_ordering(mut self, ordering: AssetOrdering) -> Self {
        self.assets = Assets::new(ordering);
        self
    }

    // ----- variables -----

    /// Sets a variable.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.vars.insert(name.to_string(), value.into());
    }

    /// Returns a copy of a variable, or `default` when it is not set.
    pub fn get(&self, name: &str, default: impl Into<Value>) -> Value {
        match self.vars.get(name) {
            Some(value) => value.clone(),
            None => default.into(),
        }
    }

    /// Borrows a variable.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Mutably borrows a variable.
    pub fn value_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.vars.get_mut(name)
    }

    /// Returns true if the variable is set.
    pub fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Printable form of a variable, or `default` when it is not set.
    ///
    /// Strings are returned as-is, `null` as an empty string, everything
    /// else as JSON.
    pub fn out(&self, name: &str, default: &str) -> String {
        match self.vars.get(name) {
            Some(value) => printable(value),
            None => default.to_string(),
        }
    }

    /// Like [`out`](Self::out) but passes the value (or `default`) through
    /// `f` first.
    pub fn out_with<F>(&self, name: &str, default: impl Into<Value>, f: F) -> String
    where
        F: FnOnce(Value) -> Value,
    {
        printable(&f(self.get(name, default)))
    }

    /// Printable form of a dotted path such as `user.address.city`.
    ///
    /// Path segments index objects by key and arrays by position. Returns
    /// `fallback` when any segment is missing.
    pub fn out_path(&self, path: &str, fallback: &str) -> String {
        match self.value_at(path) {
            Some(value) => printable(value),
            None => fallback.to_string(),
        }
    }

    /// Looks up a dotted path such as `user.name` or `items.0`.
    pub fn value_at(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut value = segments.next().and_then(|name| self.vars.get(name))?;
        for segment in segments {
            value = match value {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }

    // ----- master/child rendering -----

    /// Selects the master layout rendered around the outermost view.
    pub fn set_master(&mut self, master: impl Into<String>) {
        self.master = Some(master.into());
    }

    /// The current master layout, if any.
    pub fn master(&self) -> Option<&str> {
        self.master.as_deref()
    }

    /// Output of the most recent outermost render, for use in the master.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Current render depth (0 outside any render).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Renders `view` with `extra` variables overlaid.
    ///
    /// Empty names and unknown views yield an inline diagnostic naming the
    /// caller instead of an error. Other errors are returned.
    #[track_caller]
    pub fn render(&mut self, view: &str, extra: Vars) -> Result<String> {
        let site = CallSite::caller();
        self.render_at(view, extra, site)
    }

    /// [`render`](Self::render) with an explicit call site.
    pub fn render_at(&mut self, view: &str, extra: Vars, site: CallSite) -> Result<String> {
        match self.try_render_at(view, extra, site) {
            Err(err) if err.is_validation_abort() => {
                tracing::warn!(error = %err, "render aborted");
                Ok(err.diagnostic_html().unwrap_or_default())
            }
            other => other,
        }
    }

    /// Renders `view`, returning validation aborts as errors.
    #[track_caller]
    pub fn try_render(&mut self, view: &str, extra: Vars) -> Result<String> {
        let site = CallSite::caller();
        self.try_render_at(view, extra, site)
    }

    /// [`try_render`](Self::try_render) with an explicit call site.
    pub fn try_render_at(&mut self, view: &str, extra: Vars, site: CallSite) -> Result<String> {
        if view.trim().is_empty() {
            return Err(GidError::InvalidViewName { location: site });
        }
        let Some(body) = self.views.resolve(view)? else {
            return Err(GidError::ViewNotFound {
                view: view.to_string(),
                location: site,
            });
        };

        let mut saved = Vec::with_capacity(extra.len());
        for (key, value) in extra {
            let previous = self.vars.insert(key.clone(), value);
            saved.push((key, previous));
        }

        self.depth += 1;
        tracing::trace!(view, depth = self.depth, "rendering view");
        let produced = body.render(self);
        self.restore(saved);

        let result = match produced {
            Ok(buffer) if self.depth == 1 => {
                self.content = buffer;
                self.render_master(site)
            }
            other => other,
        };

        self.depth -= 1;
        result
    }

    fn restore(&mut self, saved: Vec<(String, Option<Value>)>) {
        for (key, previous) in saved {
            match (previous, self.scope) {
                (Some(value), _) => {
                    self.vars.insert(key, value);
                }
                (None, ScopeRestore::Strict) => {
                    self.vars.remove(&key);
                }
                (None, ScopeRestore::Overlaid) => {}
            }
        }
    }

    fn render_master(&mut self, site: CallSite) -> Result<String> {
        let Some(master) = self.master.clone() else {
            return Ok(self.content.clone());
        };

        match self.views.resolve(&master)? {
            Some(layout) => layout.render(self),
            None => Err(GidError::ViewNotFound {
                view: master,
                location: site,
            }),
        }
    }

    // ----- assets -----

    /// The asset registries.
    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    /// Registers (or re-registers) a stylesheet.
    pub fn add_style(&mut self, name: &str, url: &str, deps: &[String], media: Option<&str>) {
        self.assets.add_style(name, url, deps, media);
    }

    /// Registers (or re-registers) a script.
    pub fn add_script(
        &mut self,
        name: &str,
        url: &str,
        deps: &[String],
        placement: Placement,
        wrap: ConditionalWrap,
    ) {
        self.assets.add_script(name, url, deps, placement, wrap);
    }

    /// Stylesheet tags in dependency order.
    pub fn styles(&self) -> Result<String> {
        self.assets.render_styles()
    }

    /// Script tags for `placement` in dependency order.
    pub fn scripts(&self, placement: Placement) -> Result<String> {
        self.assets.render_scripts(placement)
    }
}

fn printable(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
