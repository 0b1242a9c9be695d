use tracing::{debug, info};

use super::setup::run_setup;
use super::Session;
use crate::error::CommandError;
use crate::provider::SuggestionRequest;
use crate::ui::SelectionPrompt;

/// Appended after the suggestions; choosing it asks for the message instead.
pub const WRITE_CUSTOM_OPTION: &str = "Write custom message";

const SELECT_TITLE: &str = "Select a commit message:";
const FALLBACK_TITLE: &str = "AI provider is not configured. Please choose an option:";
const FALLBACK_CUSTOM: &str = "Write custom commit message";
const FALLBACK_SETUP: &str = "Setup AI configuration";
const MESSAGE_PROMPT: &str = "Enter your commit message: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitCommand {
    /// `-m/--message`: commit with this text and skip suggestions.
    pub message: Option<String>,
}

impl CommitCommand {
    pub async fn execute(&self, session: &mut Session<'_>) -> Result<(), CommandError> {
        if let Some(message) = self.message.as_deref().filter(|m| !m.trim().is_empty()) {
            session.git.commit(message)?;
            return Ok(());
        }

        let staged_files = session.git.staged_files()?;
        let diff = session.git.staged_diff()?;
        if staged_files.trim().is_empty() || diff.trim().is_empty() {
            return Err(CommandError::NoStagedChanges);
        }

        session.terminal.write_line("Staged files:")?;
        session.terminal.write_line(staged_files.trim())?;
        session.terminal.write_line("----------")?;

        let prompt = session.prompts.commit_prompt(&staged_files, &diff);
        let request = SuggestionRequest::commit_messages(prompt);
        let result = session.provider.generate(session.config, &request).await;
        let suggestions = match result {
            Ok(suggestions) => suggestions,
            Err(e) if e.is_not_configured() => {
                info!("{e}");
                return unconfigured_fallback(session);
            }
            Err(e) => return Err(e.into()),
        };
        debug!(count = suggestions.len(), "received commit suggestions");

        let mut options = suggestions.into_vec();
        options.push(WRITE_CUSTOM_OPTION.to_string());
        let custom_index = options.len() - 1;

        let choice = SelectionPrompt::new(SELECT_TITLE, &options)
            .run(&mut *session.terminal)?
            .ok_or(CommandError::Cancelled("no commit message selected"))?;

        // Matched by position so a suggestion that happens to equal the
        // sentinel text is still committed as-is.
        let message = if choice == custom_index {
            read_custom_message(session)?
        } else {
            options.swap_remove(choice)
        };

        session.git.commit(&message)?;
        Ok(())
    }
}

/// Shown when no provider credentials are available: commit by hand, or
/// run setup and ask the user to retry.
fn unconfigured_fallback(session: &mut Session<'_>) -> Result<(), CommandError> {
    let options = [FALLBACK_CUSTOM.to_string(), FALLBACK_SETUP.to_string()];
    let prompt = SelectionPrompt::new(FALLBACK_TITLE, &options);

    match prompt.run(&mut *session.terminal)? {
        Some(0) => {
            let message = read_custom_message(session)?;
            session.git.commit(&message)?;
            Ok(())
        }
        Some(_) => {
            run_setup(session)?;
            Err(CommandError::SetupCompleted)
        }
        None => Err(CommandError::Cancelled("no option selected")),
    }
}

fn read_custom_message(session: &mut Session<'_>) -> Result<String, CommandError> {
    let message = session.terminal.read_line(MESSAGE_PROMPT)?;
    let message = message.trim();
    if message.is_empty() {
        return Err(CommandError::EmptyMessage);
    }
    Ok(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{suggestions, Harness};
    use crate::config::ConfigKey;
    use crate::error::ProviderError;
    use crate::ui::testing::ScriptedTerminal;
    use crate::ui::Key;
    use std::path::PathBuf;

    fn staged(harness: &mut Harness, files: &str, diff: &str) {
        let files = files.to_string();
        let diff = diff.to_string();
        harness
            .git
            .expect_staged_files()
            .returning(move || Ok(files.clone()));
        harness
            .git
            .expect_staged_diff()
            .returning(move || Ok(diff.clone()));
    }

    fn expect_commit(harness: &mut Harness, expected: &'static str) {
        harness
            .git
            .expect_commit()
            .withf(move |message| message == expected)
            .times(1)
            .returning(|_| Ok(()));
    }

    async fn run_ai_flow(harness: &mut Harness) -> Result<(), CommandError> {
        let mut session = harness.session();
        CommitCommand { message: None }.execute(&mut session).await
    }

    #[tokio::test]
    async fn test_choosing_second_suggestion_commits_its_text() {
        let mut harness = Harness::new(ScriptedTerminal::new([Key::Down, Key::Enter]));
        staged(&mut harness, "src/lib.rs\n", "+pub fn parse() {}\n");
        harness
            .provider
            .expect_generate()
            .withf(|_, request| request.count == 3 && request.prompt.contains("src/lib.rs"))
            .times(1)
            .returning(|_, _| {
                Ok(suggestions(&[
                    "feat: add parser",
                    "feat: expose parse function",
                    "chore: parser scaffolding",
                ]))
            });
        expect_commit(&mut harness, "feat: expose parse function");

        run_ai_flow(&mut harness).await.unwrap();

        let frame = &harness.terminal.frames[0];
        let options: Vec<&str> = frame
            .lines()
            .filter(|line| line.starts_with("> ") || line.starts_with("  "))
            .collect();
        assert_eq!(
            options,
            vec![
                "> feat: add parser",
                "  feat: expose parse function",
                "  chore: parser scaffolding",
                "  Write custom message",
            ]
        );
        assert!(harness
            .terminal
            .printed()
            .starts_with("Staged files:\nsrc/lib.rs\n----------"));
    }

    #[tokio::test]
    async fn test_no_staged_changes_never_calls_provider() {
        let mut harness = Harness::new(ScriptedTerminal::default());
        staged(&mut harness, "", "  \n");
        harness.provider.expect_generate().times(0);
        harness.git.expect_commit().times(0);

        let err = run_ai_flow(&mut harness).await.unwrap_err();
        assert!(matches!(err, CommandError::NoStagedChanges));
        assert_eq!(err.to_string(), "no staged changes detected");
    }

    #[tokio::test]
    async fn test_blank_message_flag_falls_back_to_suggestions() {
        let mut harness = Harness::new(ScriptedTerminal::default());
        staged(&mut harness, "", "");
        let command = CommitCommand {
            message: Some("  ".to_string()),
        };
        let mut session = harness.session();
        let err = command.execute(&mut session).await.unwrap_err();
        assert!(matches!(err, CommandError::NoStagedChanges));
    }

    #[tokio::test]
    async fn test_custom_sentinel_reads_message() {
        let terminal = ScriptedTerminal::new([Key::Down, Key::Down, Key::Enter])
            .with_lines(["  docs: hand written  "]);
        let mut harness = Harness::new(terminal);
        staged(&mut harness, "README.md", "+docs");
        harness
            .provider
            .expect_generate()
            .returning(|_, _| Ok(suggestions(&["docs: update readme", "docs: typo"])));
        expect_commit(&mut harness, "docs: hand written");

        run_ai_flow(&mut harness).await.unwrap();
        assert_eq!(harness.terminal.prompts, vec![MESSAGE_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn test_suggestion_equal_to_sentinel_is_committed_verbatim() {
        let mut harness = Harness::new(ScriptedTerminal::new([Key::Enter]));
        staged(&mut harness, "a.txt", "+a");
        harness
            .provider
            .expect_generate()
            .returning(|_, _| Ok(suggestions(&["Write custom message"])));
        expect_commit(&mut harness, "Write custom message");

        run_ai_flow(&mut harness).await.unwrap();
        assert!(harness.terminal.prompts.is_empty());
    }

    #[tokio::test]
    async fn test_empty_custom_message_is_rejected() {
        let terminal = ScriptedTerminal::new([Key::Down, Key::Enter]).with_lines(["   "]);
        let mut harness = Harness::new(terminal);
        staged(&mut harness, "a.txt", "+a");
        harness
            .provider
            .expect_generate()
            .returning(|_, _| Ok(suggestions(&["feat: a"])));
        harness.git.expect_commit().times(0);

        let err = run_ai_flow(&mut harness).await.unwrap_err();
        assert!(matches!(err, CommandError::EmptyMessage));
    }

    #[tokio::test]
    async fn test_quitting_selection_is_an_error() {
        let mut harness = Harness::new(ScriptedTerminal::new([Key::Char('q')]));
        staged(&mut harness, "a.txt", "+a");
        harness
            .provider
            .expect_generate()
            .returning(|_, _| Ok(suggestions(&["feat: a"])));
        harness.git.expect_commit().times(0);

        let err = run_ai_flow(&mut harness).await.unwrap_err();
        assert_eq!(err.to_string(), "no commit message selected");
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_unchanged() {
        let mut harness = Harness::new(ScriptedTerminal::default());
        staged(&mut harness, "a.txt", "+a");
        harness
            .provider
            .expect_generate()
            .returning(|_, _| Err(rate_limited()));
        harness.git.expect_commit().times(0);

        let err = run_ai_flow(&mut harness).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Provider(ProviderError::Api { status: 429, .. })
        ));
        assert!(harness.terminal.frames.is_empty());
    }

    fn rate_limited() -> ProviderError {
        ProviderError::Api {
            provider: "OpenAI",
            status: 429,
            body: "quota exceeded".to_string(),
        }
    }

    fn not_configured() -> ProviderError {
        ProviderError::NotConfigured {
            provider: "OpenAI",
            missing: vec!["OpenAI API Key"],
        }
    }

    #[tokio::test]
    async fn test_unconfigured_fallback_custom_message() {
        let terminal = ScriptedTerminal::new([Key::Enter]).with_lines(["fix: manual"]);
        let mut harness = Harness::new(terminal);
        staged(&mut harness, "a.txt", "+a");
        harness
            .provider
            .expect_generate()
            .returning(|_, _| Err(not_configured()));
        expect_commit(&mut harness, "fix: manual");

        run_ai_flow(&mut harness).await.unwrap();

        let frame = &harness.terminal.frames[0];
        assert!(frame.starts_with(FALLBACK_TITLE));
        assert!(frame.contains("> Write custom commit message\n  Setup AI configuration\n"));
    }

    #[tokio::test]
    async fn test_unconfigured_fallback_setup_requires_retry() {
        let mut keys = vec![Key::Down, Key::Enter, Key::Char('1')];
        keys.extend(ScriptedTerminal::typed("sk-new"));
        keys.extend([Key::Enter, Key::Char('y')]);
        let mut harness = Harness::new(ScriptedTerminal::new(keys));
        staged(&mut harness, "a.txt", "+a");
        harness
            .provider
            .expect_generate()
            .times(1)
            .returning(|_, _| Err(not_configured()));
        harness
            .store
            .expect_save()
            .withf(|config, keys| {
                config.get(ConfigKey::AiKey) == Some("sk-new") && keys == [ConfigKey::AiKey]
            })
            .times(1)
            .returning(|_, _| Ok(PathBuf::from("/tmp/gitwise/config.yaml")));
        harness.git.expect_commit().times(0);

        let err = run_ai_flow(&mut harness).await.unwrap_err();
        assert!(matches!(err, CommandError::SetupCompleted));
        assert!(harness
            .terminal
            .printed()
            .contains("Configuration saved to /tmp/gitwise/config.yaml"));
    }

    #[tokio::test]
    async fn test_unconfigured_fallback_declined() {
        let mut harness = Harness::new(ScriptedTerminal::new([Key::Char('q')]));
        staged(&mut harness, "a.txt", "+a");
        harness
            .provider
            .expect_generate()
            .returning(|_, _| Err(not_configured()));
        harness.git.expect_commit().times(0);

        let err = run_ai_flow(&mut harness).await.unwrap_err();
        assert_eq!(err.to_string(), "no option selected");
    }
}
