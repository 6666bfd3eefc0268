// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Page handlers and their registry.
//!
//! Routes name their handler as `module Type->method`. The [`PageRegistry`]
//! maps `(module, Type)` to a factory producing a fresh [`Page`] instance,
//! which is then asked to run `method`.
//!
//! Two ways to provide a unit:
//!
//! - implement [`Page`] on a type and [`register`](PageRegistry::register)
//!   a constructor for it
//! - register closures per method with
//!   [`register_fn`](PageRegistry::register_fn)
//!
//! ```rust
//! use gid::{Context, Outcome, PageRegistry};
//!
//! let mut pages = PageRegistry::new();
//! pages.register_fn("site Home->index", |ctx: &mut Context, _args: &[String]| {
//!     ctx.response.write("<h1>Home</h1>");
//!     Ok(Outcome::Stop)
//! }).unwrap();
//! ```

use crate::context::Context;
use crate::error::{GidError, Result};
use crate::router::HandlerRef;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// What the dispatcher does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Continue with the next call-stack entry.
    Pass,
    /// Stop dispatching.
    Stop,
}

impl Outcome {
    /// The string result that means [`Outcome::Pass`].
    pub const PASS: &'static str = "pass";
}

impl From<&str> for Outcome {
    fn from(result: &str) -> Self {
        if result == Outcome::PASS {
            Outcome::Pass
        } else {
            Outcome::Stop
        }
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Stop
    }
}

/// A callable unit instantiated for one call-stack entry.
pub trait Page {
    /// Runs `method` with the route's resolved arguments.
    ///
    /// Implementations return [`GidError::UnknownMethod`] for methods they
    /// do not provide.
    fn call(&mut self, method: &str, args: &[String], ctx: &mut Context) -> Result<Outcome>;
}

/// Closure signature for per-method handlers.
pub type MethodFn = Arc<dyn Fn(&mut Context, &[String]) -> Result<Outcome> + Send + Sync>;

/// Constructor for [`Page`] instances.
pub type PageFactory = Arc<dyn Fn() -> Box<dyn Page> + Send + Sync>;

/// A [`Page`] backed by a table of closures.
#[derive(Clone)]
pub struct MethodTable {
    type_name: String,
    methods: HashMap<String, MethodFn>,
}

impl MethodTable {
    /// Creates an empty table for `type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            methods: HashMap::new(),
        }
    }

    /// Adds or replaces a method.
    pub fn insert(&mut self, method: impl Into<String>, f: MethodFn) {
        self.methods.insert(method.into(), f);
    }

    /// Returns true if `method` is defined.
    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }
}

impl Page for MethodTable {
    fn call(&mut self, method: &str, args: &[String], ctx: &mut Context) -> Result<Outcome> {
        let f = self.methods.get(method).ok_or_else(|| GidError::UnknownMethod {
            type_name: self.type_name.clone(),
            method: method.to_string(),
        })?;
        f(ctx, args)
    }
}

#[derive(Clone)]
enum Unit {
    Factory(PageFactory),
    Methods(MethodTable),
}

/// Registry of handler units keyed by module and type name.
#[derive(Clone, Default)]
pub struct PageRegistry {
    modules: BTreeMap<String, BTreeMap<String, Unit>>,
}

impl PageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor for `module Type`.
    pub fn register<F, P>(&mut self, module: &str, type_name: &str, factory: F)
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Page + 'static,
    {
        let factory: PageFactory = Arc::new(move || Box::new(factory()) as Box<dyn Page>);
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(type_name.to_string(), Unit::Factory(factory));
    }

    /// Registers a closure for one `module Type->method` handler.
    ///
    /// Replaces a constructor previously registered for the same type.
    pub fn register_fn<F>(&mut self, handler: &str, f: F) -> Result<()>
    where
        F: Fn(&mut Context, &[String]) -> Result<Outcome> + Send + Sync + 'static,
    {
        let handler = HandlerRef::parse(handler)?;
        let types = self.modules.entry(handler.module.clone()).or_default();
        let unit = types
            .entry(handler.type_name.clone())
            .or_insert_with(|| Unit::Methods(MethodTable::new(handler.type_name.as_str())));

        match unit {
            Unit::Methods(table) => table.insert(handler.method, Arc::new(f)),
            Unit::Factory(_) => {
                let mut table = MethodTable::new(handler.type_name.as_str());
                table.insert(handler.method, Arc::new(f));
                *unit = Unit::Methods(table);
            }
        }
        Ok(())
    }

    /// Creates a fresh instance for `handler`.
    ///
    /// # Errors
    ///
    /// [`GidError::UnknownModule`] or [`GidError::UnknownType`] when nothing
    /// is registered under the handler's names.
    pub fn instantiate(&self, handler: &HandlerRef) -> Result<Box<dyn Page>> {
        let types = self
            .modules
            .get(&handler.module)
            .ok_or_else(|| GidError::UnknownModule(handler.module.clone()))?;

        let unit = types
            .get(&handler.type_name)
            .ok_or_else(|| GidError::UnknownType {
                module: handler.module.clone(),
                type_name: handler.type_name.clone(),
            })?;

        Ok(match unit {
            Unit::Factory(factory) => factory(),
            Unit::Methods(table) => Box::new(table.clone()),
        })
    }

    /// Registered `(module, type)` pairs, sorted.
    pub fn units(&self) -> Vec<(String, String)> {
        self.modules
            .iter()
            .flat_map(|(module, types)| {
                types
                    .keys()
                    .map(move |type_name| (module.clone(), type_name.clone()))
            })
            .collect()
    }
}
