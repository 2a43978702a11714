//! # mcapp-cli
//!
//! Command-line interface for multi-cluster apps.
//!
//! Provides commands for:
//! - Listing, installing and deleting apps
//! - Upgrading an app to another template version
//! - Rolling an app back to a previous revision
//! - Browsing templates and their versions
//!
//! # Architecture
//!
//! Commands are written against [`mcapp_core::ResourceClient`]. The binary
//! wires them to [`http::RestClient`], which talks to the management API
//! over HTTPS; tests wire them to the in-memory fake from `mcapp-core`.
//!
//! ```text
//! ┌───────────┐   REST (JSON)    ┌──────────────────┐
//! │   mcapp   │◄────────────────►│  management API  │
//! └───────────┘     /v3/...      └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod answers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod output;

pub use cli::{Cli, Commands, Format};
pub use config::Config;
pub use error::CliError;
pub use http::RestClient;
pub use output::OutputFormat;
