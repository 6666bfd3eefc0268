// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route definition compiler.
//!
//! Route definitions have the form `METHOD /path/:name/*`:
//! - `METHOD` is an HTTP method or an alternation such as `GET|POST`
//! - `:name` segments capture ASCII `[a-z0-9\-_]*` under the given name
//! - `*` segments match anything, including `/`
//! - every other segment is matched literally
//!
//! The literal definition `*` matches every method and path. Matching is
//! case-insensitive throughout and a single trailing `/` is tolerated.

use crate::error::{GidError, Result};
use regex::Regex;
use std::collections::HashMap;

/// Character class accepted by `:name` segments.
///
/// Unicode mode is off inside the group so case folding stays ASCII:
/// `K` matches but KELVIN SIGN (U+212A) and LONG S (U+017F) do not.
const CAPTURE_CLASS: &str = r"(?-u:[a-z0-9\-_])*";

/// Segment type in a route path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal segment (e.g., "users")
    Literal(String),

    /// Named capture (e.g., ":id" -> "id")
    Capture(String),

    /// Wildcard segment ("*")
    Wildcard,
}

impl Segment {
    /// Parse a path segment into a Segment.
    pub fn parse(segment: &str) -> Self {
        if let Some(name) = segment.strip_prefix(':') {
            Segment::Capture(name.to_string())
        } else if segment == "*" {
            Segment::Wildcard
        } else {
            Segment::Literal(segment.to_string())
        }
    }

    /// Convert to a regex fragment.
    pub fn to_pattern(&self) -> String {
        match self {
            Segment::Literal(text) => regex::escape(text),
            Segment::Capture(name) => format!("(?P<{}>{})", name, CAPTURE_CLASS),
            Segment::Wildcard => ".*".to_string(),
        }
    }
}

/// A compiled route definition.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    definition: String,
    regex: Regex,
    captures: Vec<String>,
}

impl RoutePattern {
    /// Compiles a route definition.
    ///
    /// # Errors
    ///
    /// Returns [`GidError::InvalidRoute`] when the definition has no path,
    /// an empty method or an unusable capture name.
    pub fn compile(definition: &str) -> Result<Self> {
        let trimmed = definition.trim();
        if trimmed == "*" {
            return Ok(Self {
                definition: definition.to_string(),
                regex: Regex::new(r"(?si).*")?,
                captures: Vec::new(),
            });
        }

        let invalid = |reason: &str| GidError::InvalidRoute {
            definition: definition.to_string(),
            reason: reason.to_string(),
        };

        let mut tokens = trimmed.split_whitespace();
        let (method, path) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(method), Some(path), None) => (method, path),
            (Some(_), None, _) | (None, _, _) => {
                return Err(invalid("expected `METHOD /path`"))
            }
            (Some(_), Some(_), Some(_)) => {
                return Err(invalid("unexpected text after the path"))
            }
        };

        let methods: Vec<String> = method
            .to_lowercase()
            .split('|')
            .map(regex::escape)
            .collect();
        if methods.iter().any(String::is_empty) {
            return Err(invalid("empty method alternative"));
        }

        let mut captures = Vec::new();
        let mut parts = Vec::new();
        for raw in path.split('/') {
            let segment = Segment::parse(raw);
            if let Segment::Capture(name) = &segment {
                if !is_capture_name(name) {
                    return Err(invalid(&format!("invalid capture name {:?}", name)));
                }
                if captures.contains(name) {
                    return Err(invalid(&format!("duplicate capture name {:?}", name)));
                }
                captures.push(name.clone());
            }
            parts.push(segment.to_pattern());
        }

        let source = format!(
            r"(?si)^({})\s+{}/?$",
            methods.join("|"),
            parts.join("/")
        );
        let regex = Regex::new(&source)?;

        Ok(Self {
            definition: definition.to_string(),
            regex,
            captures,
        })
    }

    /// The route definition this pattern was compiled from.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// The compiled regular expression source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Names of the `:name` captures, in path order.
    pub fn capture_names(&self) -> &[String] {
        &self.captures
    }

    /// Returns true if `name` is one of this pattern's captures.
    pub fn has_capture(&self, name: &str) -> bool {
        self.captures.iter().any(|c| c == name)
    }

    /// Tests a `"<method> <path>"` probe string.
    pub fn is_match(&self, probe: &str) -> bool {
        self.regex.is_match(probe)
    }

    /// Matches a probe string and returns the named captures.
    pub fn captures(&self, probe: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(probe)?;
        Some(
            self.captures
                .iter()
                .map(|name| {
                    let value = caps.name(name).map(|m| m.as_str()).unwrap_or_default();
                    (name.clone(), value.to_string())
                })
                .collect(),
        )
    }
}

/// Builds the probe string matched against compiled patterns.
pub fn probe(method: &str, path: &str) -> String {
    format!("{} {}", method.to_lowercase(), path)
}

fn is_capture_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_parse() {
        assert_eq!(Segment::parse("users"), Segment::Literal("users".to_string()));
        assert_eq!(Segment::parse(":id"), Segment::Capture("id".to_string()));
        assert_eq!(Segment::parse("*"), Segment::Wildcard);
    }

    #[test]
    fn test_compile_named_capture() {
        let pattern = RoutePattern::compile("GET /users/:id").unwrap();
        assert_eq!(pattern.capture_names(), ["id".to_string()]);

        let caps = pattern.captures(&probe("GET", "/users/42")).unwrap();
        assert_eq!(caps.get("id"), Some(&"42".to_string()));
        assert!(pattern.is_match("get /users/42/"));
        assert!(pattern.is_match("get /USERS/abc-DEF_1"));
        assert!(!pattern.is_match("post /users/42"));
        assert!(!pattern.is_match("get /users/42/posts"));
        assert!(!pattern.is_match("get /users/4.2"));
    }

    #[test]
    fn test_capture_case_folding_is_ascii_only() {
        let pattern = RoutePattern::compile("GET /k/:id").unwrap();
        assert!(pattern.is_match("GET /k/K"));
        assert!(pattern.is_match("GET /k/s"));
        assert!(!pattern.is_match("GET /k/\u{212A}"));
        assert!(!pattern.is_match("GET /k/\u{017F}"));

        // Literal segments keep Unicode case folding.
        let pattern = RoutePattern::compile("GET /café").unwrap();
        assert!(pattern.is_match("GET /CAFÉ"));
    }

    #[test]
    fn test_match_all() {
        let pattern = RoutePattern::compile("*").unwrap();
        assert!(pattern.is_match(&probe("GET", "/")));
        assert!(pattern.is_match(&probe("DELETE", "/a/b/c")));
        assert!(pattern.is_match(&probe("Patch", "")));
    }

    #[test]
    fn test_method_alternation() {
        let pattern = RoutePattern::compile("GET|POST /form").unwrap();
        assert!(pattern.is_match(&probe("get", "/form")));
        assert!(pattern.is_match(&probe("POST", "/form")));
        assert!(!pattern.is_match(&probe("put", "/form")));
    }

    #[test]
    fn test_wildcard_spans_slashes() {
        let pattern = RoutePattern::compile("GET /static/*").unwrap();
        assert!(pattern.is_match(&probe("get", "/static/css/site.css")));
        assert!(pattern.is_match(&probe("get", "/static/")));
        assert!(!pattern.is_match(&probe("get", "/other/site.css")));
    }

    #[test]
    fn test_literal_segments_are_escaped() {
        let pattern = RoutePattern::compile("GET /feed.xml").unwrap();
        assert!(pattern.is_match(&probe("get", "/feed.xml")));
        assert!(!pattern.is_match(&probe("get", "/feedaxml")));

        let pattern = RoutePattern::compile("GET /a(b|c)").unwrap();
        assert!(pattern.is_match(&probe("get", "/a(b|c)")));
        assert!(!pattern.is_match(&probe("get", "/ab")));
    }

    #[test]
    fn test_root_route() {
        let pattern = RoutePattern::compile("GET /").unwrap();
        assert!(pattern.is_match(&probe("get", "/")));
        assert!(!pattern.is_match(&probe("get", "/x")));
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(RoutePattern::compile("/no-method").is_err());
        assert!(RoutePattern::compile("GET /a extra").is_err());
        assert!(RoutePattern::compile("GET /users/:").is_err());
        assert!(RoutePattern::compile("GET /users/:user-id").is_err());
        assert!(RoutePattern::compile("GET /:id/:id").is_err());
        assert!(RoutePattern::compile("GET| /x").is_err());
    }
}
