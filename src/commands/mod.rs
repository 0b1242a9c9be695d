pub mod commit;
pub mod setup;
pub mod status;

use crate::cli::{Commands, Invocation};
use crate::config::{ConfigStore, ProviderConfig};
use crate::error::CommandError;
use crate::git::Git;
use crate::prompts::PromptRegistry;
use crate::provider::{ProviderSpec, SuggestionProvider};
use crate::ui::Terminal;
use commit::CommitCommand;
use setup::SetupCommand;
use status::StatusCommand;

/// Everything a command needs for one invocation. Configuration is loaded
/// once by the caller and only read from here on.
pub struct Session<'a> {
    pub config: &'a ProviderConfig,
    pub git: &'a dyn Git,
    pub provider: &'a dyn SuggestionProvider,
    pub store: &'a dyn ConfigStore,
    pub terminal: &'a mut dyn Terminal,
    pub prompts: PromptRegistry,
    /// Setup menu, in the order the wizard numbers them.
    pub providers: Vec<&'static ProviderSpec>,
}

/// Enum wrapper for all commands to handle async dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitwiseCommand {
    Commit(CommitCommand),
    Status(StatusCommand),
    Setup(SetupCommand),
}

impl GitwiseCommand {
    /// Create a GitwiseCommand from the CLI command enum
    pub fn from_cli_command(command: &Commands) -> Self {
        match command {
            Commands::Commit { message } => GitwiseCommand::Commit(CommitCommand {
                message: message.clone(),
            }),
            Commands::Status => GitwiseCommand::Status(StatusCommand),
            Commands::Setup => GitwiseCommand::Setup(SetupCommand),
        }
    }

    /// Run the command, returning the process exit code.
    pub async fn execute(&self, session: &mut Session<'_>) -> Result<i32, CommandError> {
        match self {
            GitwiseCommand::Commit(cmd) => cmd.execute(session).await.map(|()| 0),
            GitwiseCommand::Status(cmd) => cmd.execute(session).await,
            GitwiseCommand::Setup(cmd) => cmd.execute(session).map(|_| 0),
        }
    }
}

/// Route a classified invocation: forward it to git untouched, or run the
/// matching enhanced command.
pub async fn dispatch(
    invocation: &Invocation,
    session: &mut Session<'_>,
) -> Result<i32, CommandError> {
    match invocation {
        Invocation::Passthrough(args) => Ok(session.git.passthrough(args)?),
        Invocation::Enhanced(cli) => {
            GitwiseCommand::from_cli_command(&cli.command)
                .execute(session)
                .await
        }
    }
}
