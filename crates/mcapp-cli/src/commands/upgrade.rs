//! Upgrade command implementation.

use std::io::Write;

use mcapp_core::answers::from_answers;
use mcapp_core::client::ResourceClient;
use mcapp_core::install::upgrade;
use mcapp_core::resolver::NameResolver;

use crate::answers::collect_answers;
use crate::cli::UpgradeArgs;
use crate::commands::show::{app_versions, find_app};
use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Handler for `upgrade`.
pub struct UpgradeCommand<'a, C> {
    client: &'a C,
}

impl<'a, C: ResourceClient> UpgradeCommand<'a, C> {
    /// Creates a new upgrade command handler.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Upgrades the app, or lists versions with `--show-versions`.
    ///
    /// The app's existing answers seed the answer map, so only the keys
    /// given on the command line change. The update is submitted without
    /// waiting for the app to converge.
    ///
    /// # Errors
    ///
    /// Returns an error if the app cannot be found, answers cannot be
    /// read, a scope or target does not resolve, the version is not
    /// offered, or the update fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &UpgradeArgs,
    ) -> Result<(), CliError> {
        let app = find_app(self.client, &args.app).await?;

        if args.show_versions {
            let versions = app_versions(self.client, &app).await?;
            return format.write(out, &versions);
        }

        let version = args.version.as_deref().ok_or_else(|| {
            CliError::InvalidArgument("a version is required, see --show-versions".to_string())
        })?;
        let answers = collect_answers(from_answers(&app.answers), &args.answers)?;

        let mut resolver = NameResolver::new(self.client);
        let updated = upgrade(&mut resolver, app, &answers, version, &args.target).await?;

        format.write(
            out,
            &Message::success(format!("Upgraded {} to {version}", updated.name)),
        )
    }
}
