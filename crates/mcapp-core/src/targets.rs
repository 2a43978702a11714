//! Deployment targets: resolving specifiers and naming them for display.

use std::collections::HashMap;

use tracing::debug;

use crate::client::{ResourceClient, list_all};
use crate::error::Result;
use crate::resolver::NameResolver;
use crate::scope::{concat_scope, parse_scope};
use crate::types::{Cluster, ListOpts, Project, Target};

/// Resolves target specifiers to project IDs, preserving their order.
///
/// Each specifier is `clusterName:projectName` or a project ID. An empty
/// input yields an empty output; falling back to the current project is
/// the caller's decision.
///
/// # Errors
///
/// Aborts on the first specifier that fails to resolve.
pub async fn resolve_targets<C: ResourceClient>(
    resolver: &mut NameResolver<'_, C>,
    specifiers: &[String],
) -> Result<Vec<String>> {
    let mut project_ids = Vec::with_capacity(specifiers.len());
    for specifier in specifiers {
        project_ids.push(resolver.resolve_project(specifier).await?);
    }
    Ok(project_ids)
}

/// Wraps project IDs as deployment targets.
#[must_use]
pub fn to_targets(project_ids: &[String]) -> Vec<Target> {
    project_ids.iter().map(Target::new).collect()
}

/// Every cluster and project, keyed by ID.
///
/// Loading drains all pages of both collections, so build one only when a
/// listing needs readable names.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    clusters: HashMap<String, Cluster>,
    projects: HashMap<String, Project>,
}

impl Directory {
    /// Fetches every cluster and project.
    ///
    /// # Errors
    ///
    /// Returns the first failure while listing either collection.
    pub async fn load<C: ResourceClient>(client: &C) -> Result<Self> {
        let clusters: Vec<Cluster> = list_all(client, &ListOpts::new()).await?;
        let projects: Vec<Project> = list_all(client, &ListOpts::new()).await?;
        debug!(
            clusters = clusters.len(),
            projects = projects.len(),
            "loaded cluster directory"
        );
        Ok(Self::from_records(clusters, projects))
    }

    /// Builds a directory from already-fetched records.
    #[must_use]
    pub fn from_records(clusters: Vec<Cluster>, projects: Vec<Project>) -> Self {
        Self {
            clusters: clusters.into_iter().map(|c| (c.id.clone(), c)).collect(),
            projects: projects.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Renders a target as `clusterName:projectName`, or its raw project ID
    /// when either name is unknown.
    #[must_use]
    pub fn readable_name(&self, target: &Target) -> String {
        let project_id = target.project_id.as_str();
        let (cluster_id, _) = parse_scope(project_id);

        match (self.clusters.get(cluster_id), self.projects.get(project_id)) {
            (Some(cluster), Some(project)) => concat_scope(&cluster.name, &project.name),
            _ => {
                debug!(target = %project_id, "cannot get readable name for target, showing ID");
                project_id.to_string()
            }
        }
    }

    /// Readable names for every target, in order.
    #[must_use]
    pub fn readable_names(&self, targets: &[Target]) -> Vec<String> {
        targets.iter().map(|t| self.readable_name(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeResourceClient;

    fn seeded() -> FakeResourceClient {
        let client = FakeResourceClient::new().with_page_size(1);
        client.insert(Cluster {
            id: "c-1".into(),
            name: "mycluster".into(),
        });
        client.insert(Project {
            id: "c-1:p-1".into(),
            name: "Default".into(),
            cluster_id: "c-1".into(),
        });
        client.insert(Project {
            id: "c-1:p-2".into(),
            name: "System".into(),
            cluster_id: "c-1".into(),
        });
        client
    }

    #[tokio::test]
    async fn resolves_mixed_specifiers_in_order() {
        let client = seeded();
        let mut resolver = NameResolver::new(&client);
        let ids = resolve_targets(
            &mut resolver,
            &["mycluster:System".to_string(), "c-1:p-1".to_string()],
        )
        .await
        .expect("resolve");
        assert_eq!(ids, vec!["c-1:p-2".to_string(), "c-1:p-1".to_string()]);
    }

    #[tokio::test]
    async fn empty_specifiers_resolve_to_nothing() {
        let client = seeded();
        let mut resolver = NameResolver::new(&client);
        assert!(resolve_targets(&mut resolver, &[]).await.expect("empty").is_empty());
    }

    #[tokio::test]
    async fn directory_names_targets() {
        let client = seeded();
        let directory = Directory::load(&client).await.expect("load");
        let names = directory.readable_names(&[
            Target::new("c-1:p-1"),
            Target::new("c-9:p-4"),
            Target::new("c-1:p-404"),
        ]);
        assert_eq!(names, vec!["mycluster:Default", "c-9:p-4", "c-1:p-404"]);
    }

    #[test]
    fn to_targets_wraps_ids() {
        let targets = to_targets(&["c-1:p-1".to_string()]);
        assert_eq!(targets, vec![Target::new("c-1:p-1")]);
    }
}
