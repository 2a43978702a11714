//! # mcapp-core
//!
//! Core logic for managing multi-cluster applications on a remote
//! orchestration control plane.
//!
//! Provides:
//! - Scoped answer keys (`cluster:project:key`) and their codec
//! - Cluster and project name resolution against the remote directory
//! - Reconciliation between flat answer maps and scoped answer records
//! - Install polling, upgrade preparation and rollback
//! - Revision and template version ordering for display
//!
//! # Architecture
//!
//! Every remote call goes through the [`client::ResourceClient`] trait.
//! The CLI crate supplies an HTTP implementation; tests use
//! [`fake::FakeResourceClient`].
//!
//! ```text
//! ┌──────────┐   names    ┌──────────────┐   records   ┌────────────────┐
//! │ mcapp-cli│──────────►│ NameResolver │────────────►│ ResourceClient │
//! └──────────┘            └──────────────┘             └────────────────┘
//!       │  flat answers          ▲                             ▲
//!       ▼                        │                             │
//! ┌──────────────┐               │        poll                 │
//! │ to_answers   │───────────────┘   ┌────────────────┐        │
//! └──────────────┘                   │ install / wait │────────┘
//!                                    └────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod answers;
pub mod client;
pub mod error;
pub mod fake;
pub mod install;
pub mod resolver;
pub mod scope;
pub mod targets;
pub mod types;
pub mod versions;

pub use answers::{FlatAnswers, from_answers, to_answers};
pub use client::{ResourceClient, drain, list_all, lookup};
pub use error::{Error, Result};
pub use fake::FakeResourceClient;
pub use install::{InstallState, PollPolicy, install, rollback, upgrade, wait_for_install};
pub use resolver::NameResolver;
pub use scope::{concat_scope, parse_scope};
pub use targets::{Directory, resolve_targets};
pub use types::{
    Answer, Catalog, Cluster, Collection, Condition, ListOpts, MultiClusterApp,
    MultiClusterAppRevision, Pagination, Project, Question, Resource, ResourceType, Target,
    Template, TemplateVersion,
};
