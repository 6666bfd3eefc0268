// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Call-stack execution.
//!
//! Entries run in order. Each entry's unit is instantiated only when the
//! entry is reached; a handler returning anything but [`Outcome::Pass`]
//! ends the run and later entries are never touched. Resolution failures
//! are returned as-is for the host to report.

use crate::context::Context;
use crate::error::Result;
use crate::handler::{Outcome, PageRegistry};
use crate::router::CallStackEntry;

/// Runs call stacks against a [`PageRegistry`].
pub struct Dispatcher<'a> {
    pages: &'a PageRegistry,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher resolving handlers through `pages`.
    pub fn new(pages: &'a PageRegistry) -> Self {
        Self { pages }
    }

    /// Executes `stack`, returning how many entries ran.
    pub fn run(&self, stack: &[CallStackEntry], ctx: &mut Context) -> Result<usize> {
        let mut executed = 0;

        for entry in stack {
            tracing::debug!(route = %entry.route, handler = %entry.handler, args = ?entry.args, "dispatching");

            let mut page = self.pages.instantiate(&entry.handler)?;
            let outcome = page.call(&entry.handler.method, &entry.args, ctx)?;
            executed += 1;

            if outcome != Outcome::Pass {
                break;
            }
        }

        Ok(executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GidError;
    use crate::router::{ActionSpec, Router};

    fn registry() -> PageRegistry {
        let mut pages = PageRegistry::new();
        pages
            .register_fn("chain Step->pass", |ctx: &mut Context, args: &[String]| {
                ctx.response.write(&format!("pass({})", args.join(",")));
                Ok(Outcome::from("pass"))
            })
            .unwrap();
        pages
            .register_fn("chain Step->stop", |ctx: &mut Context, _: &[String]| {
                ctx.response.write("stop");
                Ok(Outcome::from("done"))
            })
            .unwrap();
        pages
            .register_fn("chain Step->never", |ctx: &mut Context, _: &[String]| {
                ctx.response.write("never");
                Ok(Outcome::Stop)
            })
            .unwrap();
        pages
    }

    fn stack(router: &Router, path: &str) -> Vec<CallStackEntry> {
        router.call_stack("GET", path)
    }

    #[test]
    fn test_pass_then_stop() {
        let mut router = Router::new();
        router.register("*", ActionSpec::parse(["chain Step->pass"]).unwrap()).unwrap();
        router.register("GET /x", ActionSpec::parse(["chain Step->stop"]).unwrap()).unwrap();
        router.register("GET /:any", ActionSpec::parse(["chain Step->never"]).unwrap()).unwrap();

        let pages = registry();
        let mut ctx = Context::for_test("GET", "/x");
        let executed = Dispatcher::new(&pages).run(&stack(&router, "/x"), &mut ctx).unwrap();

        assert_eq!(executed, 2);
        assert_eq!(ctx.response.body, "pass()stop");
    }

    #[test]
    fn test_all_pass_runs_everything() {
        let mut router = Router::new();
        router.register("GET /:a", ActionSpec::parse(["chain Step->pass", "a"]).unwrap()).unwrap();
        router.register("GET /*", ActionSpec::parse(["chain Step->pass", "lit"]).unwrap()).unwrap();

        let pages = registry();
        let mut ctx = Context::for_test("GET", "/v");
        let executed = Dispatcher::new(&pages).run(&stack(&router, "/v"), &mut ctx).unwrap();

        assert_eq!(executed, 2);
        assert_eq!(ctx.response.body, "pass(v)pass(lit)");
    }

    #[test]
    fn test_later_entries_are_never_resolved() {
        let mut router = Router::new();
        router.register("GET /x", ActionSpec::parse(["chain Step->stop"]).unwrap()).unwrap();
        router.register("GET /x", ActionSpec::parse(["missing Unit->run"]).unwrap()).unwrap();

        let pages = registry();
        let mut ctx = Context::for_test("GET", "/x");
        let executed = Dispatcher::new(&pages).run(&stack(&router, "/x"), &mut ctx).unwrap();
        assert_eq!(executed, 1);
    }

    #[test]
    fn test_resolution_failure_propagates() {
        let mut router = Router::new();
        router.register("GET /x", ActionSpec::parse(["chain Step->pass"]).unwrap()).unwrap();
        router.register("GET /x", ActionSpec::parse(["missing Unit->run"]).unwrap()).unwrap();

        let pages = registry();
        let mut ctx = Context::for_test("GET", "/x");
        let err = Dispatcher::new(&pages).run(&stack(&router, "/x"), &mut ctx).unwrap_err();

        assert!(matches!(err, GidError::UnknownModule(ref m) if m == "missing"));
        assert_eq!(ctx.response.body, "pass()");
    }

    #[test]
    fn test_empty_stack() {
        let pages = registry();
        let mut ctx = Context::for_test("GET", "/");
        assert_eq!(Dispatcher::new(&pages).run(&[], &mut ctx).unwrap(), 0);
    }
}
