//! Wire records exchanged with the control plane.
//!
//! Field names follow the management API (camelCase on the wire). Every
//! record tolerates missing fields so that partial server payloads still
//! decode.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Resource types addressed by the management API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// A downstream cluster.
    Cluster,
    /// A project inside a cluster.
    Project,
    /// A catalog app template.
    Template,
    /// One version of a template.
    TemplateVersion,
    /// A multi-cluster application.
    MultiClusterApp,
    /// An immutable configuration snapshot of a multi-cluster application.
    MultiClusterAppRevision,
    /// A template catalog.
    Catalog,
}

impl ResourceType {
    /// Schema name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Project => "project",
            Self::Template => "template",
            Self::TemplateVersion => "templateVersion",
            Self::MultiClusterApp => "multiClusterApp",
            Self::MultiClusterAppRevision => "multiClusterAppRevision",
            Self::Catalog => "catalog",
        }
    }

    /// Collection path segment under the API root.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Cluster => "clusters",
            Self::Project => "projects",
            Self::Template => "templates",
            Self::TemplateVersion => "templateversions",
            Self::MultiClusterApp => "multiclusterapps",
            Self::MultiClusterAppRevision => "multiclusterapprevisions",
            Self::Catalog => "catalogs",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that lives in one of the API collections.
pub trait Resource: Serialize + DeserializeOwned {
    /// Collection the record belongs to.
    const KIND: ResourceType;

    /// Server-assigned identifier.
    fn id(&self) -> &str;
}

macro_rules! impl_resource {
    ($ty:ty, $kind:expr) => {
        impl Resource for $ty {
            const KIND: ResourceType = $kind;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

/// Equality filters applied to a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOpts {
    /// Field name to required value.
    pub filters: BTreeMap<String, String>,
}

impl ListOpts {
    /// Creates options with no filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }
}

/// Pagination state returned with a collection page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    /// URL of the next page, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// More pages remain after this one.
    pub partial: bool,
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection<T> {
    /// Records on this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Continuation, absent on single-page results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Collection<T> {
    /// Creates a single-page collection.
    #[must_use]
    pub const fn single(data: Vec<T>) -> Self {
        Self {
            data,
            pagination: None,
        }
    }

    /// URL of the next page when more pages remain.
    #[must_use]
    pub fn next_url(&self) -> Option<&str> {
        self.pagination.as_ref()?.next.as_deref()
    }
}

/// A downstream cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cluster {
    /// Cluster ID, e.g. `c-98pjr`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
}
impl_resource!(Cluster, ResourceType::Cluster);

/// A project; its ID has the form `<clusterID>:<projectID>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    /// Project ID, e.g. `c-98pjr:p-w6c5f`.
    pub id: String,
    /// Human-readable name, unique within its cluster.
    pub name: String,
    /// Owning cluster.
    pub cluster_id: String,
}
impl_resource!(Project, ResourceType::Project);

/// A template catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Catalog {
    /// Catalog ID.
    pub id: String,
    /// Catalog name.
    pub name: String,
}
impl_resource!(Catalog, ResourceType::Catalog);

/// A catalog app template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Template {
    /// Template ID, e.g. `cattle-global-data:library-redis`.
    pub id: String,
    /// Template name.
    pub name: String,
    /// Owning catalog; empty for non-global catalogs.
    pub catalog_id: String,
    /// Display categories.
    pub categories: Vec<String>,
    /// Version installed when none is requested.
    pub default_version: String,
    /// Version string to template-version URL.
    pub version_links: BTreeMap<String, String>,
}
impl_resource!(Template, ResourceType::Template);

/// A question a template asks before install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Question {
    /// Answer key the question fills.
    pub variable: String,
    /// Short label.
    pub label: String,
    /// Longer description.
    pub description: String,
    /// Value type (`string`, `int`, `boolean`, `enum`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether an answer is required.
    pub required: bool,
    /// Default value, empty when none.
    pub default: String,
    /// Allowed values for `enum` questions.
    pub options: Vec<String>,
}

/// One version of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateVersion {
    /// Composite ID `<templateID>-<version>`.
    pub id: String,
    /// Version string.
    pub version: String,
    /// Named links; `template` points back at the parent template.
    pub links: BTreeMap<String, String>,
    /// Questions asked before install.
    pub questions: Vec<Question>,
}
impl_resource!(TemplateVersion, ResourceType::TemplateVersion);

/// A scoped bundle of answer values.
///
/// A non-empty `project_id` scopes the values to one project, a non-empty
/// `cluster_id` to one cluster; both empty means global.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Answer {
    /// Cluster scope.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_id: String,
    /// Project scope.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    /// Unscoped key to value.
    pub values: BTreeMap<String, String>,
}

/// A deployment destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Target {
    /// Project the app is deployed into.
    pub project_id: String,
    /// Per-target app state reported by the server.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
}

impl Target {
    /// Creates a target for a project.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            state: String::new(),
        }
    }
}

/// A status condition on an app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Condition {
    /// Condition type, e.g. `Installed`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `True`, `False` or `Unknown`.
    pub status: String,
    /// Optional detail.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl Condition {
    /// Creates a condition.
    #[must_use]
    pub fn new(kind: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            status: status.into(),
            message: String::new(),
        }
    }
}

/// Observed status of an app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppStatus {
    /// Revision currently applied.
    pub revision_id: String,
    /// Status conditions.
    pub conditions: Vec<Condition>,
}

/// A multi-cluster application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MultiClusterApp {
    /// App ID; empty until created.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// App name.
    pub name: String,
    /// Lifecycle state reported by the server.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    /// Composite template-version ID.
    pub template_version_id: String,
    /// Deployment targets.
    pub targets: Vec<Target>,
    /// Scoped answers.
    pub answers: Vec<Answer>,
    /// Observed status.
    pub status: AppStatus,
    /// `yes`, `no` or `error`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transitioning: String,
    /// Detail for the transitioning state.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transitioning_message: String,
    /// Named links; `revisions` lists the app's revisions.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
}
impl_resource!(MultiClusterApp, ResourceType::MultiClusterApp);

/// Input for the `rollback` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackInput {
    /// Revision to restore.
    pub revision_id: String,
}

/// An immutable snapshot of an app's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MultiClusterAppRevision {
    /// Revision ID.
    pub id: String,
    /// Revision name.
    pub name: String,
    /// Creation time, RFC3339.
    pub created: String,
}
impl_resource!(MultiClusterAppRevision, ResourceType::MultiClusterAppRevision);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_decodes_wire_names() {
        let json = r#"{
            "id": "mcapp-1",
            "name": "redis",
            "templateVersionId": "cattle-global-data:library-redis-1.2.3",
            "targets": [{"projectId": "c-1:p-1", "state": "active"}],
            "answers": [{"projectId": "c-1:p-1", "values": {"replicas": "3"}}],
            "status": {"revisionId": "apprevision-1", "conditions": [{"type": "Installed", "status": "True"}]},
            "transitioning": "no"
        }"#;
        let app: MultiClusterApp = serde_json::from_str(json).expect("decode");
        assert_eq!(app.template_version_id, "cattle-global-data:library-redis-1.2.3");
        assert_eq!(app.targets[0].project_id, "c-1:p-1");
        assert_eq!(app.answers[0].values["replicas"], "3");
        assert_eq!(app.status.conditions[0].kind, "Installed");
    }

    #[test]
    fn new_app_omits_empty_fields() {
        let app = MultiClusterApp {
            name: "redis".into(),
            ..MultiClusterApp::default()
        };
        let value = serde_json::to_value(&app).expect("encode");
        assert!(value.get("id").is_none());
        assert!(value.get("transitioning").is_none());
        assert_eq!(value["name"], "redis");
    }

    #[test]
    fn global_answer_has_no_scope_fields() {
        let answer = Answer::default();
        let value = serde_json::to_value(&answer).expect("encode");
        assert!(value.get("clusterId").is_none());
        assert!(value.get("projectId").is_none());
    }

    #[test]
    fn collection_next_url() {
        let page: Collection<Cluster> = serde_json::from_str(
            r#"{"data": [], "pagination": {"next": "https://x/v3/clusters?marker=2", "partial": true}}"#,
        )
        .expect("decode");
        assert_eq!(page.next_url(), Some("https://x/v3/clusters?marker=2"));
        assert!(Collection::<Cluster>::single(vec![]).next_url().is_none());
    }

    #[test]
    fn resource_type_paths() {
        assert_eq!(ResourceType::MultiClusterApp.collection(), "multiclusterapps");
        assert_eq!(ResourceType::TemplateVersion.to_string(), "templateVersion");
    }
}
