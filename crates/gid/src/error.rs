// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the GID framework.
//!
//! This module defines [`GidError`], the main error enum, and [`CallSite`],
//! the originating source location attached to render diagnostics.
//!
//! # Error Categories
//!
//! - **Route errors**: Invalid route definitions or handler strings
//! - **Resolution errors**: Unknown module, type or method during dispatch.
//!   These are fatal for the request and propagate to the host.
//! - **Validation aborts**: Empty view name or missing view. These are
//!   render-scoped and turned into an inline diagnostic by
//!   [`TemplateEngine::render`](crate::TemplateEngine::render).
//! - **View errors**: Malformed view source
//! - **Asset errors**: Dependency cycles in topological ordering mode

use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// Source location of the code that asked for a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Source file of the caller, or the view that issued the render.
    pub file: String,
    /// Line number of the caller (1-indexed).
    pub line: u32,
}

impl CallSite {
    /// Captures the location of the caller of a `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file().to_string(),
            line: location.line(),
        }
    }

    /// Creates a call site for a line inside a view source.
    pub fn in_view(view: impl Into<String>, line: u32) -> Self {
        Self {
            file: view.into(),
            line,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// The main error type for GID operations.
#[derive(Error, Debug)]
pub enum GidError {
    /// A route definition could not be compiled.
    #[error("Invalid route {definition:?}: {reason}")]
    InvalidRoute {
        /// The route definition as registered.
        definition: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The compiled route pattern was rejected by the regex engine.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A handler string is not of the form `module Type->method`.
    #[error("Invalid handler: {0}")]
    InvalidHandler(String),

    /// No module with this name is registered.
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// The module exists but has no type with this name.
    #[error("Unknown type {type_name} in module {module}")]
    UnknownType {
        /// The module that was searched.
        module: String,
        /// The missing type.
        type_name: String,
    },

    /// The type exists but does not answer to this method.
    #[error("Unknown method {type_name}->{method}")]
    UnknownMethod {
        /// The type that was instantiated.
        type_name: String,
        /// The missing method.
        method: String,
    },

    /// A render was requested with an empty or whitespace-only view name.
    #[error("Invalid view name: Empty (at {location})")]
    InvalidViewName {
        /// Where the render was requested.
        location: CallSite,
    },

    /// The view resource could not be found.
    #[error("Invalid view path: {view} (at {location})")]
    ViewNotFound {
        /// The requested view name.
        view: String,
        /// Where the render was requested.
        location: CallSite,
    },

    /// A view source could not be parsed.
    #[error("Syntax error in view {view}: {message}")]
    ViewSyntax {
        /// The view being parsed.
        view: String,
        /// Description of the problem.
        message: String,
    },

    /// Topological asset ordering found a cycle.
    #[error("Circular dependency detected between assets: {0}")]
    DependencyCycle(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GidError {
    /// Returns true for errors that only abort the current render.
    ///
    /// These are converted to an inline diagnostic instead of failing the
    /// request.
    pub fn is_validation_abort(&self) -> bool {
        matches!(
            self,
            GidError::InvalidViewName { .. } | GidError::ViewNotFound { .. }
        )
    }

    /// Returns true for dispatch errors caused by an unknown handler.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            GidError::UnknownModule(_)
                | GidError::UnknownType { .. }
                | GidError::UnknownMethod { .. }
        )
    }

    /// Formats a render-scoped error as the inline HTML diagnostic block.
    ///
    /// Returns `None` for errors that are not validation aborts.
    pub fn diagnostic_html(&self) -> Option<String> {
        let (message, location) = match self {
            GidError::InvalidViewName { location } => {
                ("Invalid view name: Empty".to_string(), location)
            }
            GidError::ViewNotFound { view, location } => {
                (format!("Invalid view path: {}", strip_tags(view)), location)
            }
            _ => return None,
        };

        Some(format!(
            "<div class=\"gid-error\"><div>{}</div><div>FILE: {}</div><div>LINE: {}</div></div>",
            message, location.file, location.line
        ))
    }
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Convenience type alias for Results with [`GidError`].
pub type Result<T> = std::result::Result<T, GidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_site_tracks_caller() {
        let site = CallSite::caller();
        assert!(site.file.ends_with("error.rs"));
        assert!(site.line > 0);
    }

    #[test]
    fn test_classification() {
        let abort = GidError::InvalidViewName {
            location: CallSite::caller(),
        };
        assert!(abort.is_validation_abort());
        assert!(!abort.is_resolution_failure());

        let missing = GidError::UnknownModule("pages".into());
        assert!(missing.is_resolution_failure());
        assert!(missing.diagnostic_html().is_none());
    }

    #[test]
    fn test_diagnostic_strips_markup_from_view_name() {
        let err = GidError::ViewNotFound {
            view: "<b>nope</b>".into(),
            location: CallSite::in_view("src/pages.rs", 12),
        };
        let html = err.diagnostic_html().unwrap();
        assert!(html.contains("Invalid view path: nope"));
        assert!(html.contains("FILE: src/pages.rs"));
        assert!(html.contains("LINE: 12"));
    }
}
