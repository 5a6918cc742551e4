//! CLI for the Jules API client.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use jules_core::api::{AutomationMode, CreateSessionInput};
use jules_core::{config, ApiError, JulesClient};
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;

use commands::{
    run_approve_plan, run_completions, run_create_session, run_get_activity, run_get_session,
    run_get_source, run_list_activities, run_list_sessions, run_list_sources, run_send_message,
    run_session_result, run_show_config, run_wait_for_state,
};

/// Top-level CLI. Every API command prints one JSON envelope on stdout.
#[derive(Debug, Parser)]
#[command(name = "jules")]
#[command(about = "Command-line client for the Jules API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct PageArgs {
    /// Maximum number of items to return (1-100).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: Option<u32>,
    /// Token from a previous response's `nextPageToken`.
    #[arg(long)]
    pub page_token: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    #[command(flatten)]
    Api(ApiCommand),

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Commands that need a resolved configuration.
#[derive(Debug, Subcommand)]
pub enum ApiCommand {
    /// List sources (repositories) accessible to the API key.
    ListSources {
        #[command(flatten)]
        page: PageArgs,
        /// Server-side filter expression.
        #[arg(long)]
        filter: Option<String>,
    },

    /// Get one source by resource name.
    GetSource {
        /// e.g. sources/github/owner/repo
        name: String,
    },

    /// List sessions.
    ListSessions {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Create a session for a source and prompt.
    CreateSession {
        /// Source resource name: sources/<provider>/<owner>/<repo>.
        #[arg(long)]
        source: String,
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        title: Option<String>,
        /// Branch the session starts from (required by the API).
        #[arg(long)]
        starting_branch: Option<String>,
        /// Pause for explicit plan approval before making changes.
        #[arg(long)]
        require_plan_approval: bool,
        /// AUTO_CREATE_PR (default) or AUTOMATION_MODE_UNSPECIFIED.
        #[arg(long)]
        automation_mode: Option<AutomationMode>,
    },

    /// Get one session by resource name.
    GetSession {
        /// e.g. sessions/1234
        name: String,
    },

    /// List activities of a session.
    ListActivities {
        session: String,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Get one activity by resource name.
    GetActivity {
        /// e.g. sessions/1234/activities/abcd
        name: String,
    },

    /// Send a follow-up message to a session.
    SendMessage {
        session: String,
        #[arg(long)]
        prompt: String,
    },

    /// Approve the pending plan of a session.
    ApprovePlan { session: String },

    /// Poll a session until it reaches a target state or the timeout elapses.
    WaitForState {
        session: String,
        /// Target state; repeatable. Defaults to COMPLETED, FAILED and CANCELLED.
        #[arg(long = "target", value_name = "STATE")]
        targets: Vec<String>,
        /// Overall deadline in milliseconds (500-7200000).
        #[arg(long, value_parser = clap::value_parser!(u64).range(500..=7_200_000))]
        timeout_ms: Option<u64>,
        /// Delay between polls in milliseconds (100-120000).
        #[arg(long, value_parser = clap::value_parser!(u64).range(100..=120_000))]
        poll_interval_ms: Option<u64>,
    },

    /// Summarize a session: state, PR URL and latest activity.
    SessionResult {
        session: String,
        /// Skip fetching activities.
        #[arg(long)]
        no_activities: bool,
        /// Activities page size (1-100, default 50).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        activities_page_size: Option<u32>,
    },

    /// Print the resolved configuration with the API key redacted.
    ShowConfig,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();
        cli.command.run().await
    }

    async fn run(self) -> Result<ExitCode> {
        match self {
            CliCommand::Completions { shell } => {
                run_completions(shell)?;
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::Api(command) => {
                let cfg = config::load().context("loading configuration")?;
                tracing::debug!(config = ?cfg.summary(), "loaded config");
                let client = JulesClient::new(Arc::new(cfg));
                output::emit(command.dispatch(&client).await)
            }
        }
    }
}

impl ApiCommand {
    async fn dispatch(self, client: &JulesClient) -> Result<Value, ApiError> {
        match self {
            ApiCommand::ListSources { page, filter } => {
                run_list_sources(client, page, filter).await
            }
            ApiCommand::GetSource { name } => run_get_source(client, &name).await,
            ApiCommand::ListSessions { page } => run_list_sessions(client, page).await,
            ApiCommand::CreateSession {
                source,
                prompt,
                title,
                starting_branch,
                require_plan_approval,
                automation_mode,
            } => {
                let input = CreateSessionInput {
                    source_resource_name: source,
                    prompt,
                    title,
                    starting_branch,
                    require_plan_approval: Some(require_plan_approval),
                    automation_mode,
                };
                run_create_session(client, input).await
            }
            ApiCommand::GetSession { name } => run_get_session(client, &name).await,
            ApiCommand::ListActivities { session, page } => {
                run_list_activities(client, &session, page).await
            }
            ApiCommand::GetActivity { name } => run_get_activity(client, &name).await,
            ApiCommand::SendMessage { session, prompt } => {
                run_send_message(client, &session, prompt).await
            }
            ApiCommand::ApprovePlan { session } => run_approve_plan(client, &session).await,
            ApiCommand::WaitForState {
                session,
                targets,
                timeout_ms,
                poll_interval_ms,
            } => run_wait_for_state(client, &session, targets, timeout_ms, poll_interval_ms).await,
            ApiCommand::SessionResult {
                session,
                no_activities,
                activities_page_size,
            } => run_session_result(client, &session, !no_activities, activities_page_size).await,
            ApiCommand::ShowConfig => Ok(run_show_config(client.config())),
        }
    }
}

#[cfg(test)]
mod tests;
