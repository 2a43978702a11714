//! Codec for the `cluster:project:key` scoping convention.
//!
//! Answer keys and target specifiers carry their scope as a `:`-separated
//! prefix. Keys are not escaped, so a key containing `:` cannot be
//! represented.

/// Separator between scope segments.
pub const SCOPE_SEPARATOR: char = ':';

/// Joins a scope and a key as `scope:key`.
#[must_use]
pub fn concat_scope(scope: &str, key: &str) -> String {
    format!("{scope}{SCOPE_SEPARATOR}{key}")
}

/// Splits a reference on its first `:`.
///
/// Without a separator the whole reference is the key and the scope is
/// empty.
#[must_use]
pub fn parse_scope(reference: &str) -> (&str, &str) {
    reference
        .split_once(SCOPE_SEPARATOR)
        .unwrap_or(("", reference))
}

/// An answer key split into its scope segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedKey<'a> {
    /// `key`
    Global {
        /// Unscoped key.
        key: &'a str,
    },
    /// `cluster:key`
    Cluster {
        /// Cluster name or ID.
        cluster: &'a str,
        /// Unscoped key.
        key: &'a str,
    },
    /// `cluster:project:key`; extra separators stay in `key`.
    Project {
        /// Cluster name or ID.
        cluster: &'a str,
        /// Project name or ID.
        project: &'a str,
        /// Unscoped key.
        key: &'a str,
    },
}

impl<'a> ScopedKey<'a> {
    /// Splits an answer key into at most three segments.
    #[must_use]
    pub fn parse(scoped: &'a str) -> Self {
        let mut parts = scoped.splitn(3, SCOPE_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(cluster), Some(project), Some(key)) => Self::Project {
                cluster,
                project,
                key,
            },
            (Some(cluster), Some(key), None) => Self::Cluster { cluster, key },
            _ => Self::Global { key: scoped },
        }
    }
}
