// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP response abstraction for the GID framework.
//!
//! Handlers write into the [`Response`] of their request context; adapters
//! convert it to their platform-specific response type.

use std::collections::HashMap;

/// A platform-agnostic HTTP response.
///
/// # Example
///
/// ```rust
/// use gid::Response;
///
/// let mut page = Response::html(200, "<h1>Hello</h1>");
/// page.write("<p>more</p>");
///
/// let redirect = Response::redirect("/login");
/// assert_eq!(redirect.location(), Some("/login"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// HTTP headers
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: String,
}

impl Default for Response {
    fn default() -> Self {
        Self::html(200, "")
    }
}

impl Response {
    /// Creates an HTML response.
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "text/html; charset=utf-8".to_string(),
        );
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Creates a redirect response (HTTP 302).
    pub fn redirect(location: impl Into<String>) -> Self {
        let mut response = Self::html(302, "");
        response.set_redirect(location);
        response
    }

    /// Creates the response used when no route matches.
    pub fn not_found() -> Self {
        Self::html(404, "<h1>404 Not Found</h1>")
    }

    /// Appends to the body.
    pub fn write(&mut self, text: &str) {
        self.body.push_str(text);
    }

    /// Turns this response into a 302 redirect to `location`.
    pub fn set_redirect(&mut self, location: impl Into<String>) {
        self.status = 302;
        self.headers.insert("location".to_string(), location.into());
    }

    /// Redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        self.headers.get("location").map(String::as_str)
    }

    /// Sets a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Returns true for 3xx responses.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_response() {
        let mut response = Response::html(200, "<p>");
        response.write("x</p>");
        assert_eq!(response.body, "<p>x</p>");
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("text/html; charset=utf-8")
        );
        assert!(!response.is_redirect());
    }

    #[test]
    fn test_redirect() {
        let mut response = Response::default();
        response.set_redirect("/login");
        assert_eq!(response.status, 302);
        assert!(response.is_redirect());
        assert_eq!(response.location(), Some("/login"));
    }

    #[test]
    fn test_not_found() {
        assert_eq!(Response::not_found().status, 404);
    }
}
