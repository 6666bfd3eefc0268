// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Application configuration.
//!
//! [`AppConfig`] is plain data so hosts can deserialize it from any format;
//! the CLI reads it from the `[app]` table of `gid.toml`:
//!
//! ```toml
//! [app]
//! views_dir = "views"
//! view_extension = "html"
//! master = "layout"
//! domain = "example.com"
//! path_prefix = "blog"
//! scope_restore = "overlaid"
//! asset_order = "greedy"
//! ```

use crate::assets::AssetOrdering;
use crate::resolver::FileSystemViews;
use crate::template::ScopeRestore;
use serde::Deserialize;

/// Settings shared by every request of an application.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding view files (default: "views").
    #[serde(default = "default_views_dir")]
    pub views_dir: String,

    /// Extension appended to view names (default: "html").
    #[serde(default = "default_view_extension")]
    pub view_extension: String,

    /// Master layout applied to every request, if any.
    #[serde(default)]
    pub master: Option<String>,

    /// Domain used for absolute URLs.
    #[serde(default)]
    pub domain: Option<String>,

    /// Path segment the application is mounted under (default: none).
    #[serde(default)]
    pub path_prefix: String,

    /// Build absolute URLs with `https`.
    #[serde(default)]
    pub secure: bool,

    /// How render overlays are restored (default: "overlaid").
    #[serde(default)]
    pub scope_restore: ScopeRestore,

    /// How assets are ordered (default: "greedy").
    #[serde(default)]
    pub asset_order: AssetOrdering,

    /// Number of parsed views kept in memory (default: 64).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_views_dir() -> String {
    "views".to_string()
}

fn default_view_extension() -> String {
    "html".to_string()
}

fn default_cache_capacity() -> usize {
    FileSystemViews::DEFAULT_CACHE_CAPACITY
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            views_dir: default_views_dir(),
            view_extension: default_view_extension(),
            master: None,
            domain: None,
            path_prefix: String::new(),
            secure: false,
            scope_restore: ScopeRestore::default(),
            asset_order: AssetOrdering::default(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl AppConfig {
    /// Builds a URL for an application path.
    ///
    /// The path prefix is always applied; the scheme and domain only when
    /// `include_domain` is set and a domain is configured.
    pub fn url(&self, path: &str, include_domain: bool) -> String {
        let mut url = String::new();
        if include_domain {
            if let Some(domain) = &self.domain {
                url.push_str(if self.secure { "https://" } else { "http://" });
                url.push_str(domain.trim_end_matches('/'));
            }
        }

        let prefix = self.path_prefix.trim_matches('/');
        if !prefix.is_empty() {
            url.push('/');
            url.push_str(prefix);
        }

        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
        url
    }

    /// Creates the filesystem view resolver described by this configuration.
    pub fn file_views(&self) -> FileSystemViews {
        FileSystemViews::with_capacity(&self.views_dir, self.cache_capacity)
            .with_extension(self.view_extension.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_without_domain() {
        let config = AppConfig::default();
        assert_eq!(config.url("/about", true), "/about");
        assert_eq!(config.url("about", false), "/about");
    }

    #[test]
    fn test_url_with_domain_and_prefix() {
        let config = AppConfig {
            domain: Some("example.com".into()),
            path_prefix: "/blog/".into(),
            secure: true,
            ..AppConfig::default()
        };
        assert_eq!(config.url("/posts/1", true), "https://example.com/blog/posts/1");
        assert_eq!(config.url("/posts/1", false), "/blog/posts/1");
    }

    #[test]
    fn test_file_views_use_configured_directory() {
        let config = AppConfig {
            views_dir: "site/views".into(),
            view_extension: "phtml".into(),
            ..AppConfig::default()
        };
        let views = config.file_views();
        assert_eq!(
            views.view_path("home"),
            Some(std::path::PathBuf::from("site/views/home.phtml"))
        );
    }
}
