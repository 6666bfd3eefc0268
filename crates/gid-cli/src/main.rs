// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gid_cli::commands;
use gid_cli::config::{Config, CONFIG_FILE};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gid")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Regex routing and master/child views from a gid.toml", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured routes in registration order
    Routes,
    /// Show the call stack a request would run
    Match {
        /// HTTP method, e.g. GET
        method: String,
        /// Request URI, optionally with a query string
        uri: String,
    },
    /// Render a view and print the result
    Render {
        /// View name relative to the views directory
        view: String,
        /// Variables as key=value (JSON values allowed)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },
    /// Serve the application over HTTP
    Serve {
        /// Port to run the server on
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Routes => commands::routes::run(&config),
        Commands::Match { method, uri } => commands::matching::run(&config, &method, &uri),
        Commands::Render { view, vars } => commands::render::run(&config, &view, &vars),
        Commands::Serve { port, host } => commands::serve::run(&config, host, port).await,
    }
}
