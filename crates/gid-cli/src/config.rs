// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Project configuration.
//!
//! Configuration is loaded from `gid.toml` at the project root.
//!
//! # Example Configuration
//!
//! ```toml
//! [app]
//! views_dir = "views"
//! master = "layout"
//! path_prefix = ""
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! static_dir = "static"
//!
//! [[route]]
//! pattern = "*"
//! action = "views Log->request"
//!
//! [[route]]
//! pattern = "GET /users/:id"
//! action = ["views View->show", "user", "id"]
//! ```

use anyhow::Context as _;
use gid::{ActionSpec, App, AppConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "gid.toml";

/// Main configuration structure loaded from `gid.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Core application settings.
    #[serde(default)]
    pub app: AppConfig,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Routes in registration order.
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteConfig>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server host (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served under `/static`, if any.
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

/// One `[[route]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    /// Route definition, e.g. `GET /users/:id` or `*`.
    pub pattern: String,
    /// Handler string, or handler followed by argument names.
    pub action: ActionConfig,
}

/// The `action` of a route.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ActionConfig {
    /// `"module Type->method"`
    Handler(String),
    /// `["module Type->method", "arg", ...]`
    WithArgs(Vec<String>),
}

impl ActionConfig {
    /// Converts to the core action type.
    pub fn to_spec(&self) -> gid::Result<ActionSpec> {
        match self {
            ActionConfig::Handler(handler) => ActionSpec::parse([handler.as_str()]),
            ActionConfig::WithArgs(parts) => ActionSpec::parse(parts.iter().map(String::as_str)),
        }
    }
}

impl Config {
    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Makes relative directories relative to `base` instead of the
    /// working directory.
    fn resolve_paths(&mut self, base: &Path) {
        if base.as_os_str().is_empty() {
            return;
        }
        self.app.views_dir = join(base, &self.app.views_dir);
        if let Some(dir) = &self.server.static_dir {
            self.server.static_dir = Some(join(base, dir));
        }
    }

    /// Static directory as a path.
    pub fn static_dir(&self) -> Option<PathBuf> {
        self.server.static_dir.as_ref().map(PathBuf::from)
    }

    /// Builds the application: file views, configured routes and the
    /// built-in `views` handler module.
    pub fn build_app(&self) -> anyhow::Result<App> {
        let mut app = App::from_config(self.app.clone());
        for route in &self.routes {
            let action = route
                .action
                .to_spec()
                .with_context(|| format!("Invalid action for route {:?}", route.pattern))?;
            app.register(&route.pattern, action)?;
        }
        crate::pages::register_builtin(app.pages_mut())?;
        Ok(app)
    }
}

fn join(base: &Path, dir: &str) -> String {
    let dir_path = Path::new(dir);
    if dir_path.is_absolute() {
        dir.to_string()
    } else {
        base.join(dir_path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[app]
master = "layout"
path_prefix = "site"
scope_restore = "strict"
asset_order = "topological"

[server]
port = 8080
static_dir = "public"

[[route]]
pattern = "*"
action = "views Log->request"

[[route]]
pattern = "GET /users/:id"
action = ["views View->show", "user", "id"]
"#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.app.master.as_deref(), Some("layout"));
        assert_eq!(config.app.views_dir, "views");
        assert_eq!(config.app.scope_restore, gid::ScopeRestore::Strict);
        assert_eq!(config.app.asset_order, gid::AssetOrdering::Topological);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].pattern, "GET /users/:id");
    }

    #[test]
    fn test_action_forms() {
        let config = Config::parse(SAMPLE).unwrap();
        assert!(matches!(
            config.routes[0].action.to_spec().unwrap(),
            ActionSpec::Simple(_)
        ));
        match config.routes[1].action.to_spec().unwrap() {
            ActionSpec::Parameterized(handler, args) => {
                assert_eq!(handler.to_string(), "views View->show");
                assert_eq!(args, vec!["user".to_string(), "id".to_string()]);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.routes.is_empty());
        assert_eq!(config.server.port, 3000);
        assert!(config.static_dir().is_none());
    }

    #[test]
    fn test_relative_paths_follow_config_file() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.resolve_paths(Path::new("/srv/site"));
        assert_eq!(config.app.views_dir, "/srv/site/views");
        assert_eq!(config.static_dir(), Some(PathBuf::from("/srv/site/public")));
    }

    #[test]
    fn test_invalid_route_fails_build() {
        let config = Config::parse("[[route]]\npattern = \"GET\"\naction = \"views Log->request\"\n").unwrap();
        assert!(config.build_app().is_err());
    }
}
