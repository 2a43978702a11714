//! Rollback command implementation.
//!
//! Handles rolling an app back to one of its previous revisions.

use std::io::Write;

use mcapp_core::client::{ResourceClient, lookup};
use mcapp_core::install::rollback;
use mcapp_core::types::{ListOpts, MultiClusterAppRevision};

use crate::cli::RollbackArgs;
use crate::commands::show::{app_revisions, find_app};
use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Handler for the rollback command.
pub struct RollbackCommand<'a, C> {
    client: &'a C,
}

impl<'a, C: ResourceClient> RollbackCommand<'a, C> {
    /// Creates a new rollback command handler.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Executes the rollback command, or lists revisions with
    /// `--show-revisions`.
    ///
    /// # Errors
    ///
    /// Returns error if the app or revision cannot be found or the
    /// rollback action fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &RollbackArgs,
    ) -> Result<(), CliError> {
        let app = find_app(self.client, &args.app).await?;

        if args.show_revisions {
            let revisions = app_revisions(self.client, &app).await?;
            return format.write(out, &revisions);
        }

        let reference = args.revision.as_deref().ok_or_else(|| {
            CliError::InvalidArgument("a revision is required, see --show-revisions".to_string())
        })?;
        let revision: MultiClusterAppRevision =
            lookup(self.client, reference, ListOpts::new()).await?;
        rollback(self.client, &app, &revision.id).await?;

        format.write(
            out,
            &Message::success(format!(
                "Rolled back {} to revision {}",
                app.name, revision.name
            )),
        )
    }
}
