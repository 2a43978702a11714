//! Cluster and project name resolution.
//!
//! A [`NameResolver`] is built per command invocation. It memoizes the
//! references it has already resolved so that an answer map mentioning
//! the same cluster many times only queries the directory once; the
//! memo dies with the resolver because the remote inventory can change
//! between invocations.

use std::collections::HashMap;

use tracing::debug;

use crate::client::{ResourceClient, lookup};
use crate::error::Result;
use crate::scope::parse_scope;
use crate::types::{Cluster, ListOpts, Project};

/// Resolves cluster and project references to canonical IDs.
pub struct NameResolver<'a, C> {
    client: &'a C,
    clusters: HashMap<String, String>,
    projects: HashMap<String, String>,
}

impl<C> std::fmt::Debug for NameResolver<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameResolver")
            .field("clusters", &self.clusters)
            .field("projects", &self.projects)
            .finish_non_exhaustive()
    }
}

impl<'a, C: ResourceClient> NameResolver<'a, C> {
    /// Creates a resolver with empty memo tables.
    #[must_use]
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            clusters: HashMap::new(),
            projects: HashMap::new(),
        }
    }

    /// The client this resolver queries.
    #[must_use]
    pub const fn client(&self) -> &'a C {
        self.client
    }

    /// Resolves a cluster name or ID to its ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Ambiguous` from the lookup.
    pub async fn resolve_cluster(&mut self, name_or_id: &str) -> Result<String> {
        if let Some(id) = self.clusters.get(name_or_id) {
            return Ok(id.clone());
        }

        let cluster: Cluster = lookup(self.client, name_or_id, ListOpts::new()).await?;
        debug!(reference = %name_or_id, id = %cluster.id, "resolved cluster");
        self.clusters.insert(name_or_id.to_string(), cluster.id.clone());
        Ok(cluster.id)
    }

    /// Resolves a project scope to a project ID.
    ///
    /// The scope is either a project ID (`c-1:p-1`) or a
    /// `clusterName:projectName` pair. The cluster segment is resolved
    /// first: when it comes back unchanged it already was a cluster ID, so
    /// the whole scope is looked up as a project. Otherwise the project
    /// segment is looked up by name within the resolved cluster.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Ambiguous` from either lookup.
    pub async fn resolve_project(&mut self, scope: &str) -> Result<String> {
        if let Some(id) = self.projects.get(scope) {
            return Ok(id.clone());
        }

        let (cluster_ref, project_ref) = parse_scope(scope);
        let cluster_id = self.resolve_cluster(cluster_ref).await?;

        // A project named like a cluster ID takes the ID path here.
        let project: Project = if cluster_id == cluster_ref {
            lookup(self.client, scope, ListOpts::new()).await?
        } else {
            lookup(
                self.client,
                project_ref,
                ListOpts::new().with_filter("clusterId", cluster_id.as_str()),
            )
            .await?
        };

        debug!(scope = %scope, id = %project.id, "resolved project");
        self.projects.insert(scope.to_string(), project.id.clone());
        Ok(project.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fake::FakeResourceClient;
    use crate::types::ResourceType;

    fn directory() -> FakeResourceClient {
        let client = FakeResourceClient::new();
        client.insert(Cluster {
            id: "c-1".into(),
            name: "mycluster".into(),
        });
        client.insert(Cluster {
            id: "c-2".into(),
            name: "other".into(),
        });
        client.insert(Project {
            id: "c-1:p-1".into(),
            name: "myproject".into(),
            cluster_id: "c-1".into(),
        });
        client.insert(Project {
            id: "c-2:p-7".into(),
            name: "myproject".into(),
            cluster_id: "c-2".into(),
        });
        client
    }

    #[tokio::test]
    async fn cluster_by_name_and_id() {
        let client = directory();
        let mut resolver = NameResolver::new(&client);
        assert_eq!(resolver.resolve_cluster("mycluster").await.expect("name"), "c-1");
        assert_eq!(resolver.resolve_cluster("c-2").await.expect("id"), "c-2");
    }

    #[tokio::test]
    async fn cluster_resolution_is_memoized() {
        let client = directory();
        let mut resolver = NameResolver::new(&client);
        resolver.resolve_cluster("c-1").await.expect("first");
        resolver.resolve_cluster("c-1").await.expect("second");
        assert_eq!(client.by_id_calls(ResourceType::Cluster, "c-1"), 1);
    }

    #[tokio::test]
    async fn project_by_names_is_scoped_to_cluster() {
        let client = directory();
        let mut resolver = NameResolver::new(&client);
        assert_eq!(
            resolver.resolve_project("mycluster:myproject").await.expect("c-1"),
            "c-1:p-1"
        );
        assert_eq!(
            resolver.resolve_project("other:myproject").await.expect("c-2"),
            "c-2:p-7"
        );
    }

    #[tokio::test]
    async fn project_id_is_resolved_whole() {
        let client = directory();
        let mut resolver = NameResolver::new(&client);
        assert_eq!(resolver.resolve_project("c-1:p-1").await.expect("id"), "c-1:p-1");
        // The project was fetched by its full ID, never by the bare `p-1` segment.
        assert_eq!(client.by_id_calls(ResourceType::Project, "c-1:p-1"), 1);
        assert_eq!(client.by_id_calls(ResourceType::Project, "p-1"), 0);
    }

    #[tokio::test]
    async fn unknown_cluster_aborts() {
        let client = directory();
        let mut resolver = NameResolver::new(&client);
        let err = resolver
            .resolve_project("nowhere:myproject")
            .await
            .expect_err("missing cluster");
        assert!(matches!(
            err,
            Error::NotFound {
                kind: ResourceType::Cluster,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn scope_without_separator_fails() {
        let client = directory();
        let mut resolver = NameResolver::new(&client);
        assert!(resolver.resolve_project("myproject").await.is_err());
    }
}
