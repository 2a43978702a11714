//! Install, upgrade and rollback of multi-cluster apps.
//!
//! Installing creates the app and then polls it at a fixed interval until
//! it reports an `Installed=True` condition, flips into the `error`
//! transitioning state, or the timeout runs out. The poll is a wait for
//! the server to converge, not a retry: any failed fetch ends it.

use std::time::Duration;

use tracing::{debug, info};

use crate::answers::{FlatAnswers, to_answers};
use crate::client::ResourceClient;
use crate::error::{Error, Result};
use crate::resolver::NameResolver;
use crate::targets::{resolve_targets, to_targets};
use crate::types::{MultiClusterApp, RollbackInput, Template, TemplateVersion};

/// Time between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long an install is waited for.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(60);

const TRANSITIONING_ERROR: &str = "error";

/// Fixed-interval polling schedule with a hard timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep before each poll.
    pub interval: Duration,
    /// Total time budget.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_INSTALL_TIMEOUT)
    }
}

impl PollPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Default interval with a timeout in whole seconds.
    #[must_use]
    pub const fn with_timeout_secs(secs: u64) -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, Duration::from_secs(secs))
    }

    /// Maximum number of polls before giving up.
    ///
    /// A poll is only started while `polls * interval < timeout`. A zero
    /// interval allows a single poll.
    #[must_use]
    pub fn max_polls(&self) -> u32 {
        if self.timeout.is_zero() {
            return 0;
        }
        if self.interval.is_zero() {
            return 1;
        }
        let polls = self.timeout.as_nanos().div_ceil(self.interval.as_nanos());
        u32::try_from(polls).unwrap_or(u32::MAX)
    }
}

/// Where an install stands after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    /// Still converging.
    Waiting,
    /// The app reported `Installed=True`.
    Installed,
    /// The app entered the error state; carries the server's message.
    Failed(String),
    /// The timeout ran out first.
    TimedOut,
}

impl InstallState {
    /// Classifies a freshly fetched app.
    ///
    /// Condition matching is case-insensitive. An installed app counts as
    /// installed even if it also reports an error transition.
    #[must_use]
    pub fn observe(app: &MultiClusterApp) -> Self {
        let installed = app.status.conditions.iter().any(|c| {
            c.kind.eq_ignore_ascii_case("installed") && c.status.eq_ignore_ascii_case("true")
        });
        if installed {
            Self::Installed
        } else if app.transitioning == TRANSITIONING_ERROR {
            Self::Failed(app.transitioning_message.clone())
        } else {
            Self::Waiting
        }
    }

    /// True for every state except [`InstallState::Waiting`].
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

/// Polls an app until it is installed.
///
/// Sleeps `policy.interval` before every fetch. Dropping the returned
/// future cancels the wait.
///
/// # Errors
///
/// Returns [`Error::RemoteFailure`] when the app enters the error state,
/// [`Error::Timeout`] after [`PollPolicy::max_polls`] polls, or any fetch
/// failure.
pub async fn wait_for_install<C: ResourceClient>(
    client: &C,
    app_id: &str,
    policy: PollPolicy,
) -> Result<MultiClusterApp> {
    let max_polls = policy.max_polls();
    let mut polls = 0_u32;

    let (state, last) = loop {
        if polls >= max_polls {
            break (InstallState::TimedOut, None);
        }
        polls += 1;
        tokio::time::sleep(policy.interval).await;

        let app: MultiClusterApp = client.by_id(app_id).await?;
        let state = InstallState::observe(&app);
        if state.is_terminal() {
            break (state, Some(app));
        }
        debug!(app = %app_id, poll = polls, state = %app.state, "app not installed yet");
    };

    match (state, last) {
        (InstallState::Installed, Some(app)) => {
            info!(app = %app_id, polls, "app installed");
            Ok(app)
        }
        (InstallState::Failed(message), _) => {
            info!(app = %app_id, polls, message = %message, "app install failed");
            Err(Error::RemoteFailure { message })
        }
        _ => {
            info!(app = %app_id, polls, "install wait timed out");
            Err(Error::Timeout)
        }
    }
}

/// Creates an app and waits for it to install.
///
/// # Errors
///
/// Returns the create failure or any [`wait_for_install`] error.
pub async fn install<C: ResourceClient>(
    client: &C,
    app: &MultiClusterApp,
    policy: PollPolicy,
) -> Result<MultiClusterApp> {
    let created = client.create(app).await?;
    info!(
        app = %created.id,
        name = %created.name,
        targets = created.targets.len(),
        "created multi-cluster app"
    );
    wait_for_install(client, &created.id, policy).await
}

/// Extracts a template-version ID from a template's version link.
#[must_use]
pub fn template_version_id_from_link(link: &str) -> &str {
    let path = link.split(['?', '#']).next().unwrap_or(link);
    path.rsplit('/').next().unwrap_or(path)
}

/// Picks the template-version ID to install.
///
/// Uses `requested` when given, otherwise the template's default
/// version. `template_ref` is how the user named the template and is only
/// used in the error message.
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] when the template does not offer
/// the version.
pub fn select_template_version(
    template: &Template,
    requested: Option<&str>,
    template_ref: &str,
) -> Result<String> {
    let version = requested
        .filter(|v| !v.is_empty())
        .unwrap_or(template.default_version.as_str());
    template
        .version_links
        .get(version)
        .map(|link| template_version_id_from_link(link).to_string())
        .ok_or_else(|| Error::InvalidVersion {
            version: version.to_string(),
            template: template_ref.to_string(),
        })
}

/// Swaps the version suffix of a composite template-version ID.
///
/// Exactly `old_version` is removed from the end before `new_version` is
/// appended; an ID without that suffix only gains the new version.
#[must_use]
pub fn replace_version(template_version_id: &str, old_version: &str, new_version: &str) -> String {
    let base = template_version_id
        .strip_suffix(old_version)
        .unwrap_or(template_version_id);
    format!("{base}{new_version}")
}

/// Upgrades an app to `version` with new answers and, optionally, new
/// targets.
///
/// `answers` is the full flat answer map (the app's existing answers plus
/// the caller's edits). An empty `target_specifiers` keeps the app's
/// current targets; otherwise they are replaced wholesale. When the
/// current template version links back to its template, the requested
/// version is checked against the template's versions first.
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`], any resolution failure, or the
/// update failure.
pub async fn upgrade<C: ResourceClient>(
    resolver: &mut NameResolver<'_, C>,
    mut app: MultiClusterApp,
    answers: &FlatAnswers,
    version: &str,
    target_specifiers: &[String],
) -> Result<MultiClusterApp> {
    let client = resolver.client();

    app.answers = to_answers(resolver, answers).await?;

    let current: TemplateVersion = client.by_id(&app.template_version_id).await?;
    if let Some(link) = current.links.get("template") {
        let template: Template = client.get_link(link).await?;
        if !template.version_links.contains_key(version) {
            return Err(Error::InvalidVersion {
                version: version.to_string(),
                template: template.name,
            });
        }
    }
    app.template_version_id = replace_version(&current.id, &current.version, version);

    let project_ids = resolve_targets(resolver, target_specifiers).await?;
    if !project_ids.is_empty() {
        app.targets = to_targets(&project_ids);
    }

    info!(
        app = %app.id,
        from = %current.version,
        to = %version,
        template_version = %app.template_version_id,
        "upgrading multi-cluster app"
    );
    client.update(&app).await
}

/// Rolls an app back to a revision. No polling follows.
///
/// # Errors
///
/// Returns the action failure.
pub async fn rollback<C: ResourceClient>(
    client: &C,
    app: &MultiClusterApp,
    revision_id: &str,
) -> Result<()> {
    info!(app = %app.id, revision = %revision_id, "rolling back multi-cluster app");
    client
        .action(
            app,
            "rollback",
            &RollbackInput {
                revision_id: revision_id.to_string(),
            },
        )
        .await
}
