// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `routes`: List the route table
//! - `match`: Show the call stack a request would run
//! - `render`: Render a view offline
//! - `serve`: Serve the application over HTTP

/// Request matching command.
pub mod matching;
/// Offline render command.
pub mod render;
/// Route listing command.
pub mod routes;
/// HTTP server command.
pub mod serve;
