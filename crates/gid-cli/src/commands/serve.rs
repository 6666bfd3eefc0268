// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP server command.
//!
//! A thin adapter: every request that is not a static file goes to
//! [`App::handle`], and the resulting [`gid::Response`] is converted back
//! to HTTP.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use console::style;
use gid::App;
use tower_http::services::ServeDir;

use crate::config::Config;

/// Runs the HTTP server. `host` and `port` override the configuration.
pub async fn run(config: &Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let app = config.build_app()?;
    println!(
        "{} {} route(s), views from {}",
        style("Loaded").green(),
        app.router().len(),
        app.config().views_dir
    );

    let static_dir = config.static_dir();
    if let Some(dir) = &static_dir {
        println!("{} {}", style("Serving /static from").dim(), dir.display());
    }

    let router = router(Arc::new(app), static_dir.as_deref());

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);
    println!();
    println!(
        "{} {}",
        style("Server running at").green().bold(),
        style(format!("http://{}", addr)).cyan().underlined()
    );
    println!("{}", style("Press Ctrl+C to stop").dim());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Builds the axum router for `app`.
pub fn router(app: Arc<App>, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new();
    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }
    router.fallback(fallback_handler).with_state(app)
}

async fn fallback_handler(State(app): State<Arc<App>>, method: Method, uri: Uri) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    match app.handle(method.as_str(), &target) {
        Ok(response) => {
            tracing::info!(method = %method, uri = %target, status = response.status, "served");
            to_http(response)
        }
        Err(e) => {
            tracing::error!(method = %method, uri = %target, error = %e, "request failed");
            error_page(&e.to_string())
        }
    }
}

fn to_http(response: gid::Response) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    let mut builder = Response::builder().status(status);
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    builder.body(Body::from(response.body)).unwrap_or_else(|_| {
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
    })
}

fn error_page(message: &str) -> Response {
    let page = Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Error</title>
    <style>
        body {{ font-family: system-ui, sans-serif; padding: 2rem; color: #333; }}
        pre {{ background: #f5f5f5; border-left: 4px solid #e53e3e; padding: 1rem; }}
    </style>
</head>
<body>
    <h1>Error</h1>
    <pre>{}</pre>
</body>
</html>"#,
        html_escape(message)
    ));
    (StatusCode::INTERNAL_SERVER_ERROR, page).into_response()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
