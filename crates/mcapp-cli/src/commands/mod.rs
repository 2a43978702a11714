//! CLI command implementations.
//!
//! Each submodule implements one subcommand against any
//! [`ResourceClient`]:
//! - [`list`] - List apps (the default command)
//! - [`delete`] - Delete apps
//! - [`install`] - Install an app from a template and wait for it
//! - [`upgrade`] - Move an app to another template version
//! - [`rollback`] - Restore a previous revision
//! - [`templates`] - List templates and show their versions
//! - [`show`] - Show an app's revisions and versions

pub mod delete;
pub mod install;
pub mod list;
pub mod rollback;
pub mod show;
pub mod templates;
pub mod upgrade;

use std::io::{self, Write};

use mcapp_core::client::ResourceClient;

pub use delete::DeleteCommand;
pub use install::InstallCommand;
pub use list::ListCommand;
pub use rollback::RollbackCommand;
pub use show::ShowAppCommand;
pub use templates::{ListTemplatesCommand, ShowTemplateCommand};
pub use upgrade::UpgradeCommand;

use crate::answers::Prompter;
use crate::cli::{Commands, LsArgs};
use crate::config::Config;
use crate::error::CliError;
use crate::output::OutputFormat;

/// Runs one subcommand; `None` lists apps.
///
/// # Errors
///
/// Returns the command's failure.
pub async fn dispatch<C, W>(
    client: &C,
    config: &Config,
    command: Option<Commands>,
    out: &mut W,
    format: &OutputFormat,
) -> Result<(), CliError>
where
    C: ResourceClient,
    W: Write,
{
    match command.unwrap_or_else(|| Commands::Ls(LsArgs::default())) {
        Commands::Ls(args) => {
            let cmd = ListCommand::new(client);
            cmd.execute(out, format, &args).await?;
        }
        Commands::Delete(args) => {
            let cmd = DeleteCommand::new(client);
            cmd.execute(out, format, &args).await?;
        }
        Commands::Install(args) => {
            let cmd = InstallCommand::new(client, config.current_project());
            if args.no_prompt {
                cmd.execute::<_, io::StdinLock<'static>, io::Stderr>(out, format, &args, None)
                    .await?;
            } else {
                let mut prompter = Prompter::new(io::stdin().lock(), io::stderr());
                cmd.execute(out, format, &args, Some(&mut prompter)).await?;
            }
        }
        Commands::Upgrade(args) => {
            let cmd = UpgradeCommand::new(client);
            cmd.execute(out, format, &args).await?;
        }
        Commands::Rollback(args) => {
            let cmd = RollbackCommand::new(client);
            cmd.execute(out, format, &args).await?;
        }
        Commands::ListTemplates(args) => {
            let cmd = ListTemplatesCommand::new(client);
            cmd.execute(out, format, &args).await?;
        }
        Commands::ShowTemplate(args) => {
            let cmd = ShowTemplateCommand::new(client);
            cmd.execute(out, format, &args).await?;
        }
        Commands::ShowApp(args) => {
            let cmd = ShowAppCommand::new(client);
            cmd.execute(out, format, &args).await?;
        }
    }

    Ok(())
}
