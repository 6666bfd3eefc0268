// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! GID CLI library.
//!
//! Hosts a GID application described by a `gid.toml` file: routes map to
//! handlers of the built-in `views` module, views are read from disk.
//!
//! # Usage
//!
//! This crate is primarily used through the `gid` binary:
//!
//! ```bash
//! gid routes                   # List the route table
//! gid match GET /users/42      # Show the call stack for a request
//! gid render home --var a=1    # Render a view offline
//! gid serve --port 3000        # Serve over HTTP
//! ```

/// CLI commands (routes, match, render, serve).
pub mod commands;
/// Project configuration from `gid.toml`.
pub mod config;
/// Built-in `views` handler module.
pub mod pages;
