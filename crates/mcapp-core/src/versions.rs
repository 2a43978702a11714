//! Ordering of app revisions and template versions for display.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::ResourceClient;
use crate::error::{Error, Result};
use crate::types::{MultiClusterAppRevision, TemplateVersion};

/// Display format for revision timestamps, e.g. `02 Jan 2006 15:04:05 UTC`.
pub const REVISION_TIME_FORMAT: &str = "%d %b %Y %H:%M:%S %Z";

/// A revision ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionEntry {
    /// Revision name.
    pub name: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Whether the app currently runs this revision.
    pub current: bool,
}

impl RevisionEntry {
    /// Creation time in display format.
    #[must_use]
    pub fn created_display(&self) -> String {
        self.created.format(REVISION_TIME_FORMAT).to_string()
    }
}

/// Parses an RFC3339 timestamp into UTC.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] for malformed input.
pub fn parse_created(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| Error::InvalidTimestamp {
            value: raw.to_string(),
            source,
        })
}

/// Orders revisions oldest first and flags the one the app runs.
///
/// # Errors
///
/// Fails on the first revision whose timestamp does not parse.
pub fn sort_revisions(
    revisions: &[MultiClusterAppRevision],
    current_revision: &str,
) -> Result<Vec<RevisionEntry>> {
    let mut entries = revisions
        .iter()
        .map(|rev| {
            Ok(RevisionEntry {
                name: rev.name.clone(),
                created: parse_created(&rev.created)?,
                current: !current_revision.is_empty()
                    && (rev.name == current_revision || rev.id == current_revision),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.created);
    Ok(entries)
}

/// A template version ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    /// Version as published by the template.
    pub version: String,
    /// Whether this is the highlighted version.
    pub current: bool,
}

/// Parses a template version as a semantic version.
///
/// Catalog versions are not always strict semver, so a leading `v` is
/// dropped and missing minor/patch components are filled with zero
/// before parsing.
///
/// # Errors
///
/// Returns [`Error::InvalidSemver`] when the normalized text still does
/// not parse.
pub fn parse_version(raw: &str) -> Result<semver::Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split);
    let mut normalized = core.to_string();
    for _ in core.split('.').count()..3 {
        normalized.push_str(".0");
    }
    normalized.push_str(suffix);

    semver::Version::parse(&normalized).map_err(|source| Error::InvalidSemver {
        value: raw.to_string(),
        source,
    })
}

/// Orders versions ascending and flags `current`.
///
/// # Errors
///
/// Fails on the first version that does not parse; nothing is skipped.
pub fn sort_template_versions<'a, I>(versions: I, current: &str) -> Result<Vec<VersionEntry>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed = versions
        .into_iter()
        .map(|raw| Ok((parse_version(raw)?, raw)))
        .collect::<Result<Vec<_>>>()?;
    parsed.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(parsed
        .into_iter()
        .map(|(_, raw)| VersionEntry {
            version: raw.to_string(),
            current: raw == current,
        })
        .collect())
}

/// Memoizes template-version lookups within one listing.
#[derive(Debug, Default)]
pub struct TemplateVersionCache {
    versions: HashMap<String, String>,
}

impl TemplateVersionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Version string of a template version, fetched at most once.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure for an uncached ID.
    pub async fn version_of<C: ResourceClient>(&mut self, client: &C, id: &str) -> Result<String> {
        if let Some(version) = self.versions.get(id) {
            return Ok(version.clone());
        }
        let template_version: TemplateVersion = client.by_id(id).await?;
        self.versions
            .insert(id.to_string(), template_version.version.clone());
        Ok(template_version.version)
    }
}
