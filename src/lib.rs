//! splitproxy serves a production site's UI from a local development build
//! while everything else keeps talking to production.
//!
//! Requests for the production domain are classified per flow: `/api/`
//! traffic and unmatched paths (OAuth callbacks and the like) pass through
//! untouched, while UI routes are redirected to the local backend with the
//! production `Host` header preserved. Responses from the local backend get
//! the production security headers so CSP problems surface locally.
//!
//! # Architecture
//!
//! - [`flow`] -- The per-exchange model and the set-once routing decision.
//! - [`intercept`] -- The core: [`FlowHook`](intercept::FlowHook), the
//!   request-phase router, and the response-phase header injector.
//! - [`config`] -- Configuration model, validation, and file sources.
//! - [`proxy`] -- The plain-HTTP host proxy that drives the hooks.
//! - [`server`] -- Axum server setup, shared state, HTTP client, shutdown.
//! - [`cli`] / [`cmd`] -- Command-line parsing and subcommands.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty output.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Binary crate -- public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod flow;
pub mod intercept;
pub mod logging;
pub mod proxy;
pub mod server;
