//! Template commands: `list-templates` and `show-template`.

use std::io::Write;

use mcapp_core::client::{ResourceClient, list_all, lookup};
use mcapp_core::types::{Catalog, ListOpts, Template};
use mcapp_core::versions::sort_template_versions;
use tracing::debug;

use crate::cli::{ListTemplatesArgs, ShowTemplateArgs};
use crate::error::CliError;
use crate::output::{OutputFormat, TemplateList, TemplateRow, VersionList};

/// Handler for `list-templates`.
pub struct ListTemplatesCommand<'a, C> {
    client: &'a C,
}

impl<'a, C: ResourceClient> ListTemplatesCommand<'a, C> {
    /// Creates a new list-templates command handler.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Lists templates from global catalogs, optionally from one catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be found or listing fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &ListTemplatesArgs,
    ) -> Result<(), CliError> {
        let mut opts = ListOpts::new();
        if let Some(reference) = &args.catalog {
            let catalog: Catalog = lookup(self.client, reference, ListOpts::new()).await?;
            opts = opts.with_filter("catalogId", catalog.id);
        }

        let templates: Vec<Template> = list_all(self.client, &opts).await?;
        let list = TemplateList {
            templates: templates
                .into_iter()
                .filter(|t| {
                    let global = !t.catalog_id.is_empty();
                    if !global {
                        debug!(template = %t.id, "skipping template outside global catalogs");
                    }
                    global
                })
                .map(|t| TemplateRow {
                    category: t.categories.join(","),
                    id: t.id,
                    name: t.name,
                })
                .collect(),
        };
        format.write(out, &list)
    }
}

/// Handler for `show-template`.
pub struct ShowTemplateCommand<'a, C> {
    client: &'a C,
}

impl<'a, C: ResourceClient> ShowTemplateCommand<'a, C> {
    /// Creates a new show-template command handler.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Lists a template's versions with its default version marked.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be found or a version
    /// does not parse.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &ShowTemplateArgs,
    ) -> Result<(), CliError> {
        let template: Template = lookup(self.client, &args.template, ListOpts::new()).await?;
        let versions = VersionList {
            versions: sort_template_versions(
                template.version_links.keys().map(String::as_str),
                &template.default_version,
            )?,
        };
        format.write(out, &versions)
    }
}
