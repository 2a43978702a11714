//! Show-app command and the revision/version listings it shares with
//! `upgrade --show-versions` and `rollback --show-revisions`.

use std::collections::BTreeMap;
use std::io::Write;

use mcapp_core::client::{ResourceClient, drain, lookup};
use mcapp_core::types::{
    Collection, ListOpts, MultiClusterApp, MultiClusterAppRevision, Template, TemplateVersion,
};
use mcapp_core::versions::{sort_revisions, sort_template_versions};

use crate::cli::ShowAppArgs;
use crate::error::CliError;
use crate::output::{AppOverview, OutputFormat, RevisionList, VersionList};

const REVISIONS_LINK: &str = "revisions";
const TEMPLATE_LINK: &str = "template";

/// Looks up an app by name or ID.
///
/// # Errors
///
/// Returns `NotFound` or `Ambiguous` from the lookup.
pub async fn find_app<C: ResourceClient>(
    client: &C,
    reference: &str,
) -> Result<MultiClusterApp, CliError> {
    Ok(lookup(client, reference, ListOpts::new()).await?)
}

fn link<'l>(
    links: &'l BTreeMap<String, String>,
    name: &str,
    owner: &str,
) -> Result<&'l str, CliError> {
    links
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| CliError::Command(format!("{owner} has no '{name}' link")))
}

/// Every revision of `app`, oldest first, with the running one flagged.
///
/// # Errors
///
/// Returns an error if the app has no revisions link, fetching fails, or
/// a timestamp does not parse.
pub async fn app_revisions<C: ResourceClient>(
    client: &C,
    app: &MultiClusterApp,
) -> Result<RevisionList, CliError> {
    let url = link(&app.links, REVISIONS_LINK, &format!("app '{}'", app.name))?;
    let first: Collection<MultiClusterAppRevision> = client.get_link(url).await?;
    let revisions = drain(client, first).await?;
    Ok(RevisionList {
        revisions: sort_revisions(&revisions, &app.status.revision_id)?,
    })
}

/// Versions of the app's template, lowest first, with the installed one
/// flagged.
///
/// # Errors
///
/// Returns an error if the template version or template cannot be
/// fetched, or a version does not parse.
pub async fn app_versions<C: ResourceClient>(
    client: &C,
    app: &MultiClusterApp,
) -> Result<VersionList, CliError> {
    let current: TemplateVersion = client.by_id(&app.template_version_id).await?;
    let url = link(
        &current.links,
        TEMPLATE_LINK,
        &format!("template version '{}'", current.id),
    )?;
    let template: Template = client.get_link(url).await?;
    Ok(VersionList {
        versions: sort_template_versions(
            template.version_links.keys().map(String::as_str),
            &current.version,
        )?,
    })
}

/// Handler for `show-app`.
pub struct ShowAppCommand<'a, C> {
    client: &'a C,
}

impl<'a, C: ResourceClient> ShowAppCommand<'a, C> {
    /// Creates a new show-app command handler.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Prints the app's revisions, a blank line, then its versions.
    ///
    /// # Errors
    ///
    /// Returns an error if the app cannot be found or either listing
    /// fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &ShowAppArgs,
    ) -> Result<(), CliError> {
        let app = find_app(self.client, &args.app).await?;
        let overview = AppOverview {
            revisions: app_revisions(self.client, &app).await?,
            versions: app_versions(self.client, &app).await?,
        };
        format.write(out, &overview)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cli::Format;
    use mcapp_core::fake::FakeResourceClient;
    use mcapp_core::types::AppStatus;

    pub(crate) const TEMPLATE_VERSION_ID: &str = "cattle-global-data:library-redis-1.2.3";

    /// An app with two revisions and a template offering three versions.
    pub(crate) fn seeded() -> FakeResourceClient {
        let client = FakeResourceClient::new();
        client.insert(MultiClusterApp {
            id: "mcapp-1".into(),
            name: "cache".into(),
            template_version_id: TEMPLATE_VERSION_ID.into(),
            status: AppStatus {
                revision_id: "apprevision-2".into(),
                ..AppStatus::default()
            },
            links: BTreeMap::from([(
                "revisions".to_string(),
                "fake://mcapp-1/revisions".to_string(),
            )]),
            ..MultiClusterApp::default()
        });
        for (id, created) in [
            ("apprevision-2", "2024-02-01T10:00:00Z"),
            ("apprevision-1", "2024-01-01T10:00:00Z"),
        ] {
            client.insert(MultiClusterAppRevision {
                id: id.into(),
                name: id.into(),
                created: created.into(),
            });
        }
        client.insert_link(
            "fake://mcapp-1/revisions",
            &Collection::single(vec![
                MultiClusterAppRevision {
                    id: "apprevision-2".into(),
                    name: "apprevision-2".into(),
                    created: "2024-02-01T10:00:00Z".into(),
                },
                MultiClusterAppRevision {
                    id: "apprevision-1".into(),
                    name: "apprevision-1".into(),
                    created: "2024-01-01T10:00:00Z".into(),
                },
            ]),
        );
        client.insert(TemplateVersion {
            id: TEMPLATE_VERSION_ID.into(),
            version: "1.2.3".into(),
            links: BTreeMap::from([("template".to_string(), "fake://templates/redis".to_string())]),
            ..TemplateVersion::default()
        });
        client.insert_link(
            "fake://templates/redis",
            &Template {
                id: "cattle-global-data:library-redis".into(),
                name: "redis".into(),
                default_version: "1.3.0".into(),
                version_links: ["1.10.0", "1.2.3", "1.3.0"]
                    .into_iter()
                    .map(|v| (v.to_string(), format!("https://x/v3/templateVersions/redis-{v}")))
                    .collect(),
                ..Template::default()
            },
        );
        client
    }

    #[tokio::test]
    async fn shows_revisions_then_versions() {
        let client = seeded();
        let mut out = Vec::new();
        ShowAppCommand::new(&client)
            .execute(
                &mut out,
                &OutputFormat::new(Format::Table),
                &ShowAppArgs { app: "cache".into() },
            )
            .await
            .expect("show");

        let output = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "CURRENT  REVISION       CREATED");
        assert!(lines[1].starts_with("         apprevision-1"));
        assert!(lines[2].starts_with("*        apprevision-2"));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "CURRENT  VERSION");
        assert_eq!(lines[5], "*        1.2.3");
        assert_eq!(lines[6], "         1.3.0");
        assert_eq!(lines[7], "         1.10.0");
    }

    #[tokio::test]
    async fn missing_revisions_link_is_command_error() {
        let client = FakeResourceClient::new();
        client.insert(MultiClusterApp {
            id: "mcapp-1".into(),
            name: "bare".into(),
            ..MultiClusterApp::default()
        });
        let app = find_app(&client, "bare").await.expect("app");
        let err = app_revisions(&client, &app).await.expect_err("no link");
        assert!(matches!(err, CliError::Command(_)));
    }
}
