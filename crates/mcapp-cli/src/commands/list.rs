//! List command implementation.

use std::io::Write;

use mcapp_core::client::{ResourceClient, list_all};
use mcapp_core::targets::Directory;
use mcapp_core::types::{ListOpts, MultiClusterApp};
use mcapp_core::versions::TemplateVersionCache;

use crate::cli::LsArgs;
use crate::error::CliError;
use crate::output::{AppList, AppRow, OutputFormat};

/// Handler for `ls`.
pub struct ListCommand<'a, C> {
    client: &'a C,
}

impl<'a, C: ResourceClient> ListCommand<'a, C> {
    /// Creates a new list command handler.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Executes the list command.
    ///
    /// # Errors
    ///
    /// Returns an error if listing apps, the directory or a template
    /// version fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &LsArgs,
    ) -> Result<(), CliError> {
        let apps: Vec<MultiClusterApp> = list_all(self.client, &ListOpts::new()).await?;
        let list = AppList {
            apps: self.rows(apps, args.quiet).await?,
            quiet: args.quiet,
        };
        format.write(out, &list)
    }

    async fn rows(&self, apps: Vec<MultiClusterApp>, quiet: bool) -> Result<Vec<AppRow>, CliError> {
        if quiet {
            return Ok(apps
                .into_iter()
                .map(|app| AppRow {
                    id: app.id,
                    name: app.name,
                    state: app.state,
                    version: String::new(),
                    targets: Vec::new(),
                })
                .collect());
        }

        let directory = Directory::load(self.client).await?;
        let mut versions = TemplateVersionCache::new();
        let mut rows = Vec::with_capacity(apps.len());
        for app in apps {
            let version = if app.template_version_id.is_empty() {
                String::new()
            } else {
                versions
                    .version_of(self.client, &app.template_version_id)
                    .await?
            };
            rows.push(AppRow {
                targets: directory.readable_names(&app.targets),
                id: app.id,
                name: app.name,
                state: app.state,
                version,
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use mcapp_core::fake::FakeResourceClient;
    use mcapp_core::types::{Cluster, Project, ResourceType, Target, TemplateVersion};

    fn seeded() -> FakeResourceClient {
        let client = FakeResourceClient::new().with_page_size(1);
        client.insert(Cluster {
            id: "c-1".into(),
            name: "prod".into(),
        });
        client.insert(Project {
            id: "c-1:p-1".into(),
            name: "Default".into(),
            cluster_id: "c-1".into(),
        });
        client.insert(TemplateVersion {
            id: "cattle-global-data:library-redis-1.2.3".into(),
            version: "1.2.3".into(),
            ..TemplateVersion::default()
        });
        for (id, name) in [("mcapp-1", "cache"), ("mcapp-2", "sessions")] {
            client.insert(MultiClusterApp {
                id: id.into(),
                name: name.into(),
                state: "active".into(),
                template_version_id: "cattle-global-data:library-redis-1.2.3".into(),
                targets: vec![Target::new("c-1:p-1"), Target::new("c-9:p-9")],
                ..MultiClusterApp::default()
            });
        }
        client
    }

    #[tokio::test]
    async fn lists_apps_with_readable_targets() {
        let client = seeded();
        let mut out = Vec::new();
        ListCommand::new(&client)
            .execute(&mut out, &OutputFormat::new(Format::Table), &LsArgs::default())
            .await
            .expect("list");

        let output = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].contains("cache"));
        assert!(lines[1].contains("1.2.3"));
        assert!(lines[1].ends_with("prod:Default,c-9:p-9"));
        assert_eq!(
            client.by_id_calls(
                ResourceType::TemplateVersion,
                "cattle-global-data:library-redis-1.2.3"
            ),
            1
        );
    }

    #[tokio::test]
    async fn quiet_lists_ids_without_lookups() {
        let client = seeded();
        let mut out = Vec::new();
        ListCommand::new(&client)
            .execute(&mut out, &OutputFormat::new(Format::Table), &LsArgs { quiet: true })
            .await
            .expect("list");

        assert_eq!(String::from_utf8(out).expect("utf8"), "mcapp-1\nmcapp-2\n");
        assert_eq!(
            client.by_id_calls(
                ResourceType::TemplateVersion,
                "cattle-global-data:library-redis-1.2.3"
            ),
            0
        );
    }

    #[tokio::test]
    async fn missing_template_version_fails() {
        let client = FakeResourceClient::new();
        client.insert(MultiClusterApp {
            id: "mcapp-1".into(),
            name: "cache".into(),
            template_version_id: "gone".into(),
            ..MultiClusterApp::default()
        });
        let err = ListCommand::new(&client)
            .execute(&mut Vec::new(), &OutputFormat::default(), &LsArgs::default())
            .await
            .expect_err("missing");
        assert!(matches!(err, CliError::Api(_)));
    }
}
