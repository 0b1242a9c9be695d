//! Decides whether an invocation is handled here or forwarded to git.

use clap::{Parser, Subcommand};
use tracing::debug;

/// Command names parsed by gitwise itself. Everything else goes to git.
pub const ENHANCED_COMMANDS: [&str; 3] = ["commit", "status", "setup"];

const HELP_ALIASES: [&str; 3] = ["help", "--help", "-h"];

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "gitwise")]
#[command(about = "Quick git operations enhanced with AI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a commit with an AI-generated message from staged changes
    Commit {
        /// Commit message (skips AI suggestions)
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Show working tree status with AI insights
    Status,
    /// Interactive setup of the AI provider credentials
    Setup,
}

/// What to do with the raw argument vector.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Enhanced(Cli),
    /// Run git with exactly these arguments.
    Passthrough(Vec<String>),
}

/// Classify `args` (without the program name) by their first token.
pub fn classify(args: &[String]) -> Result<Invocation, clap::Error> {
    let Some(first) = args.first() else {
        debug!("no arguments, forwarding to git");
        return Ok(Invocation::Passthrough(Vec::new()));
    };

    if HELP_ALIASES.contains(&first.as_str()) {
        let forwarded = match &args[1..] {
            [] => vec!["--help".to_string()],
            rest => std::iter::once("help".to_string())
                .chain(rest.iter().cloned())
                .collect(),
        };
        debug!(?forwarded, "help requested, forwarding to git");
        return Ok(Invocation::Passthrough(forwarded));
    }

    if ENHANCED_COMMANDS.contains(&first.as_str()) {
        debug!(command = %first, "enhanced command");
        let mut argv = vec!["gitwise"];
        argv.extend(args.iter().map(String::as_str));
        return Cli::try_parse_from(argv).map(Invocation::Enhanced);
    }

    debug!(command = %first, "forwarding to git");
    Ok(Invocation::Passthrough(args.to_vec()))
}
