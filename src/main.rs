mod cli;
mod commands;
mod config;
mod error;
mod git;
mod prompts;
mod provider;
mod ui;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::{classify, Invocation};
use commands::{dispatch, Session};
use config::{FileConfigStore, ProviderConfig};
use git::{Git, SystemGit};
use prompts::PromptRegistry;
use provider::{BackendRegistry, HttpSuggestionProvider};
use ui::CrosstermTerminal;

/// Environment variable holding the tracing filter, e.g. `GITWISE_LOG=debug`.
const LOG_ENV: &str = "GITWISE_LOG";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match classify(&args) {
        Ok(invocation) => invocation,
        Err(err) => err.exit(),
    };

    match run(&invocation).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: gitwise {}: {:#}", args.join(" "), err);
            std::process::exit(1);
        }
    }
}

async fn run(invocation: &Invocation) -> Result<i32> {
    let git = SystemGit::new()?;

    // Forwarded commands never touch configuration or the terminal UI.
    if let Invocation::Passthrough(args) = invocation {
        return Ok(git.passthrough(args)?);
    }

    let config = ProviderConfig::load()?;
    let store = FileConfigStore::user()?;

    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")?;
    let provider = HttpSuggestionProvider::new(http, BackendRegistry::default());

    let mut terminal = CrosstermTerminal::new();
    let mut session = Session {
        config: &config,
        git: &git,
        provider: &provider,
        store: &store,
        terminal: &mut terminal,
        prompts: PromptRegistry::default().with_overrides(&config),
        providers: provider.registry().specs(),
    };

    Ok(dispatch(invocation, &mut session).await?)
}
