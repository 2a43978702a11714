//! Error types for multi-cluster app operations.

use thiserror::Error;

use crate::types::ResourceType;

/// Errors raised while resolving, reconciling or installing apps.
#[derive(Debug, Error)]
pub enum Error {
    /// No resource matches a name or ID query.
    #[error("not found: no {kind} matches '{name}'")]
    NotFound {
        /// Resource type that was queried.
        kind: ResourceType,
        /// Name or ID that was looked up.
        name: String,
    },

    /// More than one resource shares the queried name.
    #[error("multiple resources of type {kind} found for name '{name}': {}", ids.join(", "))]
    Ambiguous {
        /// Resource type that was queried.
        kind: ResourceType,
        /// Name that was looked up.
        name: String,
        /// IDs of every match.
        ids: Vec<String>,
    },

    /// Requested template version is not offered by the template.
    #[error(
        "version {version} for template {template} is invalid, run 'mcapp show-template {template}' for a list of versions"
    )]
    InvalidVersion {
        /// Version the user asked for.
        version: String,
        /// Template name or ID as given by the user.
        template: String,
    },

    /// Install polling exceeded its deadline.
    #[error(
        "timed out waiting for app to be active, the app could still be installing. Run 'mcapp ls' to verify"
    )]
    Timeout,

    /// The app transitioned into an error state.
    #[error("{message}")]
    RemoteFailure {
        /// Message reported by the control plane.
        message: String,
    },

    /// Underlying remote call failed.
    #[error("transport error: {message}")]
    Transport {
        /// Opaque failure description.
        message: String,
    },

    /// A revision timestamp was not RFC3339.
    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        /// Raw timestamp text.
        value: String,
        /// Parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// A template version string could not be read as a semantic version.
    #[error("invalid version '{value}': {source}")]
    InvalidSemver {
        /// Raw version text.
        value: String,
        /// Parse failure.
        #[source]
        source: semver::Error,
    },

    /// A record could not be converted to or from its wire form.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Creates a transport error from any displayable failure.
    pub fn transport(message: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: message.to_string(),
        }
    }

    /// Returns true when the error means "no such resource".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
