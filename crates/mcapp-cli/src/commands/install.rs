//! Install command implementation.
//!
//! Resolves the template and version, gathers answers, resolves targets,
//! creates the app and waits until it reports itself installed.

use std::io::{BufRead, Write};
use std::time::Duration;

use mcapp_core::answers::{FlatAnswers, to_answers};
use mcapp_core::client::{ResourceClient, lookup};
use mcapp_core::install::{DEFAULT_POLL_INTERVAL, PollPolicy, install, select_template_version};
use mcapp_core::resolver::NameResolver;
use mcapp_core::targets::{resolve_targets, to_targets};
use mcapp_core::types::{ListOpts, MultiClusterApp, Template, TemplateVersion};
use tracing::debug;

use crate::answers::{Prompter, answer_questions, collect_answers};
use crate::cli::InstallArgs;
use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Handler for `install`.
pub struct InstallCommand<'a, C> {
    client: &'a C,
    current_project: Option<&'a str>,
    poll_interval: Duration,
}

impl<'a, C: ResourceClient> InstallCommand<'a, C> {
    /// Creates a new install command handler.
    ///
    /// `current_project` is the target used when none is given.
    #[must_use]
    pub const fn new(client: &'a C, current_project: Option<&'a str>) -> Self {
        Self {
            client,
            current_project,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the status poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Executes the install command.
    ///
    /// Unanswered template questions are asked through `prompter`, or
    /// filled from their defaults when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the template, version or a target cannot be
    /// resolved, no target is available, answers cannot be read, or the
    /// app fails or times out while installing.
    pub async fn execute<W, R, PW>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &InstallArgs,
        prompter: Option<&mut Prompter<R, PW>>,
    ) -> Result<(), CliError>
    where
        W: Write,
        R: BufRead,
        PW: Write,
    {
        let template: Template = lookup(self.client, &args.template, ListOpts::new()).await?;
        let template_version_id =
            select_template_version(&template, args.version.as_deref(), &args.template)?;
        let template_version: TemplateVersion = self.client.by_id(&template_version_id).await?;
        debug!(
            template = %template.id,
            version = %template_version.version,
            questions = template_version.questions.len(),
            "selected template version"
        );

        let mut answers = collect_answers(FlatAnswers::new(), &args.answers)?;
        answer_questions(&template_version.questions, &mut answers, prompter)?;

        let mut resolver = NameResolver::new(self.client);
        let mut project_ids = resolve_targets(&mut resolver, &args.target).await?;
        if project_ids.is_empty() {
            let project = self.current_project.ok_or_else(|| {
                CliError::InvalidArgument(
                    "no target given and no current project configured, use --target or --project"
                        .to_string(),
                )
            })?;
            debug!(project = %project, "targeting current project");
            project_ids.push(project.to_string());
        }

        let app = MultiClusterApp {
            name: args.name.clone(),
            template_version_id,
            targets: to_targets(&project_ids),
            answers: to_answers(&mut resolver, &answers).await?,
            ..MultiClusterApp::default()
        };

        let policy = PollPolicy {
            interval: self.poll_interval,
            ..PollPolicy::with_timeout_secs(args.timeout)
        };
        let installed = install(self.client, &app, policy).await?;

        format.write(
            out,
            &Message::success(format!("Installed {} ({})", installed.name, installed.id)),
        )
    }
}
