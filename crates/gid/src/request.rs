// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP request abstraction for the GID framework.
//!
//! Adapters hand the raw method and request URI to [`Request::parse`],
//! which separates the query string and strips the configured path prefix
//! so routes stay relative to where the application is mounted.

use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// A platform-agnostic HTTP request.
///
/// # Example
///
/// ```rust
/// use gid::Request;
///
/// let request = Request::parse("GET", "/blog/posts/1?page=2", "blog");
/// assert_eq!(request.path, "/posts/1");
/// assert_eq!(request.query.get("page").map(String::as_str), Some("2"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// The HTTP method as received (e.g., "GET", "POST")
    pub method: String,

    /// The request path relative to the path prefix (e.g., "/posts/1")
    pub path: String,

    /// Query parameters
    pub query: HashMap<String, String>,

    /// The raw request URI
    pub uri: String,
}

impl Request {
    /// Creates a request for an already extracted path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            method: method.into(),
            uri: path.clone(),
            path,
            query: HashMap::new(),
        }
    }

    /// Parses a request URI.
    ///
    /// The path is percent-decoded (`+` is kept literally). When the first
    /// path segment equals `path_prefix` it is removed.
    pub fn parse(method: impl Into<String>, uri: &str, path_prefix: &str) -> Self {
        let (raw_path, raw_query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        let query = raw_query
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        let decoded = percent_decode_str(raw_path).decode_utf8_lossy();

        Self {
            method: method.into(),
            path: strip_prefix(&decoded, path_prefix),
            query,
            uri: uri.to_string(),
        }
    }

    /// Adds query parameters to the request.
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }
}

fn strip_prefix(path: &str, prefix: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let trimmed = path.trim_start_matches('/');

    let rest = if prefix.is_empty() {
        trimmed
    } else {
        match trimmed.strip_prefix(prefix) {
            Some("") => "",
            Some(rest) if rest.starts_with('/') => &rest[1..],
            _ => trimmed,
        }
    };

    format!("/{}", rest)
}
