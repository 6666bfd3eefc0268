// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route table and request matching.
//!
//! Routes are tested in registration order and every matching route
//! contributes one entry to the call stack:
//!
//! ```rust
//! use gid::{ActionSpec, Router};
//!
//! let mut router = Router::new();
//! router.register("GET /users/:id", ActionSpec::parse(["pages Users->show", "id"]).unwrap()).unwrap();
//! router.register("*", ActionSpec::parse(["pages Log->request"]).unwrap()).unwrap();
//!
//! let stack = router.call_stack("GET", "/users/42");
//! assert_eq!(stack.len(), 2);
//! assert_eq!(stack[0].args, vec!["42".to_string()]);
//! ```

use crate::error::{GidError, Result};
use crate::pattern::{self, RoutePattern};
use std::collections::HashMap;
use std::fmt;

/// Reference to a callable unit: `module Type->method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    /// Module (file) identifier.
    pub module: String,
    /// Type identifier inside the module.
    pub type_name: String,
    /// Method invoked on the instance.
    pub method: String,
}

impl HandlerRef {
    /// Parses `module Type->method`. Whitespace and `->` both separate parts.
    pub fn parse(handler: &str) -> Result<Self> {
        let parts: Vec<&str> = handler
            .split(|c: char| c.is_whitespace())
            .flat_map(|part| part.split("->"))
            .filter(|part| !part.is_empty())
            .collect();

        match parts.as_slice() {
            [module, type_name, method] => Ok(Self {
                module: module.to_string(),
                type_name: type_name.to_string(),
                method: method.to_string(),
            }),
            _ => Err(GidError::InvalidHandler(format!(
                "{:?} (expected `module Type->method`)",
                handler
            ))),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}->{}", self.module, self.type_name, self.method)
    }
}

/// What a route runs when it matches.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionSpec {
    /// Handler invoked without arguments.
    Simple(HandlerRef),

    /// Handler invoked with argument tokens. A token naming one of the
    /// route's captures is replaced by the captured text at match time.
    Parameterized(HandlerRef, Vec<String>),
}

impl ActionSpec {
    /// Builds an action from a handler string followed by argument tokens.
    ///
    /// A lone handler string gives [`ActionSpec::Simple`].
    pub fn parse<I, S>(parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parts = parts.into_iter();
        let handler = parts
            .next()
            .ok_or_else(|| GidError::InvalidHandler("empty action".to_string()))?;
        let handler = HandlerRef::parse(handler.as_ref())?;
        let args: Vec<String> = parts.map(|p| p.as_ref().to_string()).collect();

        if args.is_empty() {
            Ok(ActionSpec::Simple(handler))
        } else {
            Ok(ActionSpec::Parameterized(handler, args))
        }
    }

    /// The handler this action targets.
    pub fn handler(&self) -> &HandlerRef {
        match self {
            ActionSpec::Simple(handler) | ActionSpec::Parameterized(handler, _) => handler,
        }
    }
}

/// One argument of a registered route, classified against its captures.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionArg {
    /// Passed through unchanged.
    Literal(String),
    /// Replaced by the value of the named capture.
    Capture(String),
}

/// A registered (pattern, action) pair.
#[derive(Debug, Clone)]
pub struct Route {
    /// The compiled route definition.
    pub pattern: RoutePattern,
    /// The handler to run.
    pub handler: HandlerRef,
    /// Arguments with capture references resolved against the pattern.
    pub args: Vec<ActionArg>,
}

impl Route {
    fn new(pattern: RoutePattern, action: ActionSpec) -> Self {
        let (handler, args) = match action {
            ActionSpec::Simple(handler) => (handler, Vec::new()),
            ActionSpec::Parameterized(handler, tokens) => {
                let args = tokens
                    .into_iter()
                    .map(|token| {
                        if pattern.has_capture(&token) {
                            ActionArg::Capture(token)
                        } else {
                            ActionArg::Literal(token)
                        }
                    })
                    .collect();
                (handler, args)
            }
        };

        Self { pattern, handler, args }
    }

    fn bind(&self, captures: &HashMap<String, String>) -> CallStackEntry {
        let args = self
            .args
            .iter()
            .map(|arg| match arg {
                ActionArg::Literal(text) => text.clone(),
                ActionArg::Capture(name) => captures.get(name).cloned().unwrap_or_default(),
            })
            .collect();

        CallStackEntry {
            route: self.pattern.definition().to_string(),
            handler: self.handler.clone(),
            args,
        }
    }
}

/// A matched action with its arguments bound.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStackEntry {
    /// Definition of the route that produced this entry.
    pub route: String,
    /// The handler to invoke.
    pub handler: HandlerRef,
    /// Resolved arguments.
    pub args: Vec<String>,
}

/// Ordered route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates a new empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `definition` and appends it to the route table.
    ///
    /// Registering the same definition twice produces two entries.
    pub fn register(&mut self, definition: &str, action: ActionSpec) -> Result<()> {
        let pattern = RoutePattern::compile(definition)?;
        tracing::debug!(route = definition, regex = pattern.as_str(), handler = %action.handler(), "registered route");
        self.routes.push(Route::new(pattern, action));
        Ok(())
    }

    /// Registers several routes, in iteration order.
    pub fn map<I, D>(&mut self, routes: I) -> Result<()>
    where
        I: IntoIterator<Item = (D, ActionSpec)>,
        D: AsRef<str>,
    {
        for (definition, action) in routes {
            self.register(definition.as_ref(), action)?;
        }
        Ok(())
    }

    /// Matches a request against every route, in registration order.
    ///
    /// An empty result means no route matched; how to answer that is up to
    /// the caller.
    pub fn call_stack(&self, method: &str, path: &str) -> Vec<CallStackEntry> {
        let probe = pattern::probe(method, path);

        self.routes
            .iter()
            .filter_map(|route| {
                let captures = route.pattern.captures(&probe)?;
                tracing::debug!(route = route.pattern.definition(), probe = %probe, "route matched");
                Some(route.bind(&captures))
            })
            .collect()
    }

    /// Get all routes (for debugging/listing).
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true when no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
