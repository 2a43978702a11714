//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// mcapp - multi-cluster application management.
#[derive(Parser, Debug, Clone)]
#[command(name = "mcapp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Management server URL.
    #[arg(short, long, env = "MCAPP_SERVER", global = true)]
    pub server: Option<String>,

    /// API token sent as a bearer credential.
    #[arg(long, env = "MCAPP_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Current project ID, the default install target.
    #[arg(short, long, env = "MCAPP_PROJECT", global = true)]
    pub project: Option<String>,

    /// Config file to load instead of `~/.mcapp/config.toml`.
    #[arg(short, long, env = "MCAPP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Subcommand to execute; lists apps when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List multi-cluster apps.
    Ls(LsArgs),

    /// Delete multi-cluster apps.
    Delete(DeleteArgs),

    /// Install a multi-cluster app from a template.
    ///
    /// Installs the template's default version unless --version is given,
    /// then waits for the app to report itself installed.
    ///
    /// Examples:
    ///   mcapp install redis appFoo
    ///   mcapp install --answers answers.yaml redis appFoo
    ///   mcapp install --set foo=bar --set baz=bunk --version 1.0.1 redis appFoo
    ///   mcapp install --target mycluster:Default --target c-98pjr:p-w6c5f redis appFoo
    #[command(verbatim_doc_comment)]
    Install(InstallArgs),

    /// Upgrade an app to another template version.
    Upgrade(UpgradeArgs),

    /// Roll an app back to a previous revision.
    Rollback(RollbackArgs),

    /// List templates available for installation.
    #[command(visible_alias = "lt")]
    ListTemplates(ListTemplatesArgs),

    /// Show the versions available for a template.
    #[command(visible_alias = "st")]
    ShowTemplate(ShowTemplateArgs),

    /// Show an app's revisions and available versions.
    #[command(visible_alias = "sa")]
    ShowApp(ShowAppArgs),
}

/// Arguments for `ls`.
#[derive(Args, Debug, Clone, Default)]
pub struct LsArgs {
    /// Only display IDs.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for `delete`.
#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// App names or IDs.
    #[arg(required = true, value_name = "APP")]
    pub apps: Vec<String>,
}

/// Answer sources shared by install and upgrade.
#[derive(Args, Debug, Clone, Default)]
pub struct AnswerArgs {
    /// Answers file: a JSON or YAML map of key to value.
    #[arg(short, long, value_name = "FILE")]
    pub answers: Option<PathBuf>,

    /// Helm values file; nested keys become dotted answer keys.
    #[arg(long, value_name = "FILE")]
    pub values: Option<PathBuf>,

    /// Set an answer, e.g. `--set foo=bar` or `--set mycluster:foo=bar`.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

/// Arguments for `install`.
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Template name or ID.
    pub template: String,

    /// Name of the app to create.
    pub name: String,

    /// Answer sources.
    #[command(flatten)]
    pub answers: AnswerArgs,

    /// Template version to install.
    #[arg(long)]
    pub version: Option<String>,

    /// Use defaults instead of asking for unanswered questions.
    #[arg(long)]
    pub no_prompt: bool,

    /// Target projects (`cluster:project` names or project IDs).
    #[arg(short, long, value_name = "TARGET")]
    pub target: Vec<String>,

    /// Seconds to wait for the app to become ready.
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,
}

/// Arguments for `upgrade`.
#[derive(Args, Debug, Clone)]
pub struct UpgradeArgs {
    /// App name or ID.
    pub app: String,

    /// Template version to upgrade to.
    #[arg(required_unless_present = "show_versions")]
    pub version: Option<String>,

    /// Answer sources.
    #[command(flatten)]
    pub answers: AnswerArgs,

    /// Display the versions available to upgrade to.
    #[arg(short = 'v', long)]
    pub show_versions: bool,

    /// Replace all targets with these; omit to keep the current targets.
    #[arg(short, long, value_name = "TARGET")]
    pub target: Vec<String>,
}

/// Arguments for `rollback`.
#[derive(Args, Debug, Clone)]
pub struct RollbackArgs {
    /// App name or ID.
    pub app: String,

    /// Revision name or ID to roll back to.
    #[arg(required_unless_present = "show_revisions")]
    pub revision: Option<String>,

    /// Show the revisions available to roll back to.
    #[arg(short = 'r', long)]
    pub show_revisions: bool,
}

/// Arguments for `list-templates`.
#[derive(Args, Debug, Clone, Default)]
pub struct ListTemplatesArgs {
    /// Only list templates from this catalog.
    #[arg(long)]
    pub catalog: Option<String>,
}

/// Arguments for `show-template`.
#[derive(Args, Debug, Clone)]
pub struct ShowTemplateArgs {
    /// Template name or ID.
    pub template: String,
}

/// Arguments for `show-app`.
#[derive(Args, Debug, Clone)]
pub struct ShowAppArgs {
    /// App name or ID.
    pub app: String,
}
