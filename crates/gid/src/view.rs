// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! View bodies.
//!
//! A [`View`] produces markup for the [`TemplateEngine`] and may call back
//! into it to read variables, render nested views or register assets.
//! Closures implement [`View`] directly; [`TextView`] is parsed from a text
//! source with `{{ ... }}` directives:
//!
//! | Directive                                  | Effect                               |
//! |--------------------------------------------|--------------------------------------|
//! | `{{ title }}`, `{{ user.name }}`           | variable output                      |
//! | `{{ title or "Untitled" }}`                | variable output with fallback        |
//! | `{{> sidebar }}`                           | nested render                        |
//! | `{{> card title="Hi" user=post.author }}`  | nested render with extra variables   |
//! | `{{ @content }}`                           | content of the outermost render      |
//! | `{{ @master layout }}`                     | select the master layout             |
//! | `{{ @styles }}`, `{{ @scripts [header] }}` | asset tags                           |
//! | `{{ @style name url [after=a,b] [media=m] }}` | register a stylesheet             |
//! | `{{ @script name url [after=a,b] [header] }}` | register a script                 |

use crate::assets::{ConditionalWrap, Placement};
use crate::error::{CallSite, GidError, Result};
use crate::template::{TemplateEngine, Vars};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref DIRECTIVE_RE: Regex = Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap();
    static ref VARIABLE_RE: Regex =
        Regex::new(r#"^([A-Za-z_][A-Za-z0-9_\-]*(?:\.[A-Za-z0-9_\-]+)*)(?:\s+or\s+"(.*)")?$"#).unwrap();
    static ref ARGUMENT_RE: Regex = Regex::new(
        r#"^\s+([A-Za-z_][A-Za-z0-9_\-]*)=(?:"([^"]*)"|([A-Za-z_][A-Za-z0-9_\-]*(?:\.[A-Za-z0-9_\-]+)*))"#
    )
    .unwrap();
}

/// A renderable view body.
pub trait View: Send + Sync {
    /// Produces the view's markup.
    fn render(&self, engine: &mut TemplateEngine) -> Result<String>;
}

impl<F> View for F
where
    F: Fn(&mut TemplateEngine) -> Result<String> + Send + Sync,
{
    fn render(&self, engine: &mut TemplateEngine) -> Result<String> {
        self(engine)
    }
}

/// One parsed piece of a text view.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal markup.
    Text(String),
    /// Variable output: dotted path plus optional fallback.
    Variable {
        /// Variable name followed by nested keys.
        path: String,
        /// Output when the variable is missing.
        fallback: String,
    },
    /// Nested render of another view.
    Render {
        /// View to render.
        view: String,
        /// Variables overlaid for the nested render.
        args: Vec<(String, RenderArg)>,
        /// Source line of the directive.
        line: u32,
    },
    /// Content of the outermost render.
    Content,
    /// Master layout selection.
    Master(String),
    /// Stylesheet tags.
    Styles,
    /// Script tags for one placement.
    Scripts(Placement),
    /// Stylesheet registration.
    Style {
        /// Asset name.
        name: String,
        /// Stylesheet URL.
        url: String,
        /// Dependencies.
        after: Vec<String>,
        /// Optional media attribute.
        media: Option<String>,
    },
    /// Script registration.
    Script {
        /// Asset name.
        name: String,
        /// Script URL.
        url: String,
        /// Dependencies.
        after: Vec<String>,
        /// Header or body placement.
        placement: Placement,
    },
}

/// Value of one `key=...` argument of a nested render.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderArg {
    /// `key="text"`
    Literal(String),
    /// `key=path`, read from the current variables; null when missing.
    Variable(String),
}

/// A view parsed from text.
#[derive(Debug, Clone)]
pub struct TextView {
    name: String,
    nodes: Vec<Node>,
}

impl TextView {
    /// Parses `source`. `name` is used in diagnostics.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let mut nodes = Vec::new();
        let mut last = 0;

        for caps in DIRECTIVE_RE.captures_iter(source) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            if whole.start > last {
                nodes.push(Node::Text(source[last..whole.start].to_string()));
            }
            last = whole.end;

            let newlines = source[..whole.start].matches('\n').count();
            let line = u32::try_from(newlines).unwrap_or(u32::MAX).saturating_add(1);
            let body = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            nodes.push(parse_directive(&name, body, line)?);
        }

        if last < source.len() {
            nodes.push(Node::Text(source[last..].to_string()));
        }

        Ok(Self { name, nodes })
    }

    /// Name the view was parsed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed nodes, in source order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl View for TextView {
    fn render(&self, engine: &mut TemplateEngine) -> Result<String> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Variable { path, fallback } => out.push_str(&engine.out_path(path, fallback)),
                Node::Render { view, args, line } => {
                    let extra: Vars = args
                        .iter()
                        .map(|(key, arg)| {
                            let value = match arg {
                                RenderArg::Literal(text) => Value::String(text.clone()),
                                RenderArg::Variable(path) => {
                                    engine.value_at(path).cloned().unwrap_or(Value::Null)
                                }
                            };
                            (key.clone(), value)
                        })
                        .collect();
                    let site = CallSite::in_view(self.name.as_str(), *line);
                    out.push_str(&engine.render_at(view, extra, site)?);
                }
                Node::Content => out.push_str(engine.content()),
                Node::Master(master) => engine.set_master(master.as_str()),
                Node::Styles => out.push_str(&engine.styles()?),
                Node::Scripts(placement) => out.push_str(&engine.scripts(*placement)?),
                Node::Style { name, url, after, media } => {
                    engine.add_style(name, url, after, media.as_deref());
                }
                Node::Script { name, url, after, placement } => {
                    engine.add_script(name, url, after, *placement, ConditionalWrap::default());
                }
            }
        }
        Ok(out)
    }
}

fn parse_directive(view: &str, body: &str, line: u32) -> Result<Node> {
    let syntax = |message: String| GidError::ViewSyntax {
        view: view.to_string(),
        message: format!("line {}: {}", line, message),
    };

    if let Some(target) = body.strip_prefix('>') {
        let target = target.trim();
        let (view, mut rest) = target.split_at(target.find(char::is_whitespace).unwrap_or(target.len()));

        let mut args = Vec::new();
        while !rest.is_empty() {
            let caps = ARGUMENT_RE
                .captures(rest)
                .ok_or_else(|| syntax(format!("bad render argument {:?}", rest.trim())))?;
            let arg = match caps.get(2) {
                Some(text) => RenderArg::Literal(text.as_str().to_string()),
                None => RenderArg::Variable(caps[3].to_string()),
            };
            args.push((caps[1].to_string(), arg));
            rest = &rest[caps[0].len()..];
        }

        return Ok(Node::Render {
            view: view.to_string(),
            args,
            line,
        });
    }

    if let Some(command) = body.strip_prefix('@') {
        let mut words = command.split_whitespace();
        let keyword = words.next().unwrap_or_default();
        let rest: Vec<&str> = words.collect();

        return match (keyword, rest.as_slice()) {
            ("content", []) => Ok(Node::Content),
            ("styles", []) => Ok(Node::Styles),
            ("scripts", []) | ("scripts", ["body"]) => Ok(Node::Scripts(Placement::Body)),
            ("scripts", ["header"]) => Ok(Node::Scripts(Placement::Header)),
            ("master", [master]) => Ok(Node::Master(master.to_string())),
            ("style", [name, url, options @ ..]) => {
                let mut after = Vec::new();
                let mut media = None;
                for option in options {
                    if let Some(list) = option.strip_prefix("after=") {
                        after = split_list(list);
                    } else if let Some(value) = option.strip_prefix("media=") {
                        media = Some(value.to_string());
                    } else {
                        return Err(syntax(format!("unknown style option {:?}", option)));
                    }
                }
                Ok(Node::Style {
                    name: name.to_string(),
                    url: url.to_string(),
                    after,
                    media,
                })
            }
            ("script", [name, url, options @ ..]) => {
                let mut after = Vec::new();
                let mut placement = Placement::Body;
                for option in options {
                    if let Some(list) = option.strip_prefix("after=") {
                        after = split_list(list);
                    } else if *option == "header" {
                        placement = Placement::Header;
                    } else {
                        return Err(syntax(format!("unknown script option {:?}", option)));
                    }
                }
                Ok(Node::Script {
                    name: name.to_string(),
                    url: url.to_string(),
                    after,
                    placement,
                })
            }
            _ => Err(syntax(format!("unknown directive @{}", command.trim()))),
        };
    }

    let caps = VARIABLE_RE
        .captures(body)
        .ok_or_else(|| syntax(format!("cannot parse {:?}", body)))?;

    Ok(Node::Variable {
        path: caps[1].to_string(),
        fallback: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
    })
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
