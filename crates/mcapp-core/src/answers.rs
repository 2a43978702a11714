//! Conversion between flat answer maps and scoped answer records.
//!
//! Users edit answers as one flat map whose keys carry their scope
//! (`key`, `cluster:key`, `cluster:project:key`). The API stores them as
//! one [`Answer`] per scope, keyed by cluster or project ID.

use std::collections::BTreeMap;

use crate::client::ResourceClient;
use crate::error::Result;
use crate::resolver::NameResolver;
use crate::scope::{ScopedKey, concat_scope};
use crate::types::Answer;

/// Flat answers: scoped key to value.
pub type FlatAnswers = BTreeMap<String, String>;

type Buckets = BTreeMap<String, BTreeMap<String, String>>;

/// Converts a flat answer map into scoped answer records.
///
/// Scopes are resolved to IDs so that a name-form key and an ID-form key
/// for the same scope land in the same record. When both forms set the
/// same key, the name form wins: names come from the user while IDs come
/// from the existing app.
///
/// Records are emitted in scope-ID order with the global record first.
///
/// # Errors
///
/// Aborts on the first scope that fails to resolve.
pub async fn to_answers<C: ResourceClient>(
    resolver: &mut NameResolver<'_, C>,
    flat: &FlatAnswers,
) -> Result<Vec<Answer>> {
    let mut buckets = Buckets::new();

    for (scoped, value) in flat {
        match ScopedKey::parse(scoped) {
            ScopedKey::Global { key } => {
                buckets
                    .entry(String::new())
                    .or_default()
                    .insert(key.to_string(), value.clone());
            }
            ScopedKey::Cluster { cluster, key } => {
                let cluster_id = resolver.resolve_cluster(cluster).await?;
                set_value(&mut buckets, cluster, &cluster_id, key, value);
            }
            ScopedKey::Project {
                cluster,
                project,
                key,
            } => {
                let scope = concat_scope(cluster, project);
                let project_id = resolver.resolve_project(&scope).await?;
                set_value(&mut buckets, &scope, &project_id, key, value);
            }
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(scope_id, values)| {
            let mut answer = Answer {
                values,
                ..Answer::default()
            };
            // Only project IDs contain the separator.
            if scope_id.contains(':') {
                answer.project_id = scope_id;
            } else if !scope_id.is_empty() {
                answer.cluster_id = scope_id;
            }
            answer
        })
        .collect())
}

fn set_value(buckets: &mut Buckets, scope: &str, scope_id: &str, key: &str, value: &str) {
    let bucket = buckets.entry(scope_id.to_string()).or_default();
    // An ID-form value never replaces one already set in name form.
    if bucket.contains_key(key) && scope == scope_id {
        return;
    }
    bucket.insert(key.to_string(), value.to_string());
}

/// Flattens scoped answer records into a flat map keyed by scope ID.
#[must_use]
pub fn from_answers(answers: &[Answer]) -> FlatAnswers {
    let mut flat = FlatAnswers::new();
    for answer in answers {
        let scope = if !answer.project_id.is_empty() {
            answer.project_id.as_str()
        } else {
            answer.cluster_id.as_str()
        };
        for (key, value) in &answer.values {
            let scoped = if scope.is_empty() {
                key.clone()
            } else {
                concat_scope(scope, key)
            };
            flat.insert(scoped, value.clone());
        }
    }
    flat
}
