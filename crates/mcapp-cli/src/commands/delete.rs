//! Delete command implementation.

use std::io::Write;

use mcapp_core::client::{ResourceClient, lookup};
use mcapp_core::types::{ListOpts, MultiClusterApp};
use tracing::info;

use crate::cli::DeleteArgs;
use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Handler for `delete`.
pub struct DeleteCommand<'a, C> {
    client: &'a C,
}

impl<'a, C: ResourceClient> DeleteCommand<'a, C> {
    /// Creates a new delete command handler.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Deletes each named app in turn, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first lookup or delete failure; apps before it stay
    /// deleted.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &DeleteArgs,
    ) -> Result<(), CliError> {
        for reference in &args.apps {
            let app: MultiClusterApp = lookup(self.client, reference, ListOpts::new()).await?;
            self.client.delete(&app).await?;
            info!(app = %app.id, name = %app.name, "deleted multi-cluster app");
            format.write(out, &Message::success(format!("Deleted {}", app.name)))?;
        }
        Ok(())
    }
}
