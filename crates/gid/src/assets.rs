// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Script and style registries.
//!
//! Assets are registered by unique name with a list of dependencies and
//! emitted as `<link>`/`<script>` tags in dependency order. Scripts are kept
//! in two independent registries, one for the document head and one for the
//! end of the body.

use crate::dependencies;
use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;

/// How emission order is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetOrdering {
    /// Greedy placement at registration time (see [`dependencies::insert`]).
    #[default]
    Greedy,
    /// Full topological sort at emission time; cycles are errors.
    Topological,
}

/// Where a script tag is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Inside `<head>`.
    Header,
    /// At the end of `<body>`.
    #[default]
    Body,
}

/// Markup emitted around a script tag, e.g. IE conditional comments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionalWrap {
    /// Emitted before the tag.
    pub before: Option<String>,
    /// Emitted after the tag.
    pub after: Option<String>,
}

impl ConditionalWrap {
    /// Creates a wrap with both parts.
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: Some(before.into()),
            after: Some(after.into()),
        }
    }
}

/// A registered stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleAsset {
    /// Stylesheet URL.
    pub url: String,
    /// Optional `media` attribute.
    pub media: Option<String>,
}

/// A registered script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptAsset {
    /// Script URL.
    pub url: String,
    /// Optional markup around the tag.
    pub wrap: ConditionalWrap,
}

#[derive(Debug, Clone)]
struct AssetList<T> {
    entries: HashMap<String, T>,
    dependencies: HashMap<String, Vec<String>>,
    order: Vec<String>,
}

impl<T> Default for AssetList<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            dependencies: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T> AssetList<T> {
    fn add(&mut self, name: &str, asset: T, deps: &[String]) {
        self.entries.insert(name.to_string(), asset);
        self.dependencies.insert(name.to_string(), deps.to_vec());
        dependencies::reinsert(&mut self.order, name, deps);
    }

    fn ordered(&self, ordering: AssetOrdering) -> Result<Vec<(&str, &T)>> {
        let names = match ordering {
            AssetOrdering::Greedy => self.order.clone(),
            AssetOrdering::Topological => {
                dependencies::topological_order(&self.order, &self.dependencies)?
            }
        };

        Ok(names
            .iter()
            .filter_map(|name| {
                self.entries
                    .get_key_value(name)
                    .map(|(key, asset)| (key.as_str(), asset))
            })
            .collect())
    }
}

/// Per-request script and style registries.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    ordering: AssetOrdering,
    styles: AssetList<StyleAsset>,
    header_scripts: AssetList<ScriptAsset>,
    body_scripts: AssetList<ScriptAsset>,
}

impl Assets {
    /// Creates empty registries using `ordering` at emission time.
    pub fn new(ordering: AssetOrdering) -> Self {
        Self {
            ordering,
            ..Self::default()
        }
    }

    /// Registers (or re-registers) a stylesheet.
    pub fn add_style(&mut self, name: &str, url: &str, deps: &[String], media: Option<&str>) {
        let asset = StyleAsset {
            url: url.to_string(),
            media: media.map(str::to_string),
        };
        self.styles.add(name, asset, deps);
    }

    /// Registers (or re-registers) a script in the registry for `placement`.
    pub fn add_script(
        &mut self,
        name: &str,
        url: &str,
        deps: &[String],
        placement: Placement,
        wrap: ConditionalWrap,
    ) {
        let asset = ScriptAsset {
            url: url.to_string(),
            wrap,
        };
        self.scripts_mut(placement).add(name, asset, deps);
    }

    /// Stylesheet names in emission order.
    pub fn style_order(&self) -> Result<Vec<String>> {
        Ok(self
            .styles
            .ordered(self.ordering)?
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect())
    }

    /// Script names for `placement` in emission order.
    pub fn script_order(&self, placement: Placement) -> Result<Vec<String>> {
        Ok(self
            .scripts(placement)
            .ordered(self.ordering)?
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect())
    }

    /// Renders one `<link>` tag per stylesheet.
    pub fn render_styles(&self) -> Result<String> {
        let mut out = String::new();
        for (_, style) in self.styles.ordered(self.ordering)? {
            let media = match &style.media {
                Some(media) if !media.is_empty() => format!("media=\"{}\"", media),
                _ => String::new(),
            };
            out.push_str(&format!(
                "<link href=\"{}\" type=\"text/css\" rel=\"stylesheet\" {}/>\n",
                style.url, media
            ));
        }
        Ok(out)
    }

    /// Renders one `<script>` tag per script registered for `placement`.
    pub fn render_scripts(&self, placement: Placement) -> Result<String> {
        let mut out = String::new();
        for (_, script) in self.scripts(placement).ordered(self.ordering)? {
            if let Some(before) = &script.wrap.before {
                out.push_str(before);
            }
            out.push_str(&format!(
                "<script src=\"{}\" type=\"text/javascript\"></script>\n",
                script.url
            ));
            if let Some(after) = &script.wrap.after {
                out.push_str(after);
            }
        }
        Ok(out)
    }

    fn scripts(&self, placement: Placement) -> &AssetList<ScriptAsset> {
        match placement {
            Placement::Header => &self.header_scripts,
            Placement::Body => &self.body_scripts,
        }
    }

    fn scripts_mut(&mut self, placement: Placement) -> &mut AssetList<ScriptAsset> {
        match placement {
            Placement::Header => &mut self.header_scripts,
            Placement::Body => &mut self.body_scripts,
        }
    }
}
