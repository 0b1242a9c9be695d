use tracing::debug;

use super::Session;
use crate::error::CommandError;
use crate::provider::SuggestionRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCommand;

impl StatusCommand {
    /// Prints `git status` followed by an AI summary of the staged diff.
    /// Insight failures are printed as a single warning line and never fail
    /// the command.
    pub async fn execute(&self, session: &mut Session<'_>) -> Result<i32, CommandError> {
        if !session.git.is_work_tree() {
            return Ok(session.git.passthrough(&["status".to_string()])?);
        }

        let status = session.git.status()?;
        session.terminal.write_line("Git status:")?;
        session.terminal.write_line(status.trim_end())?;

        let diff = session.git.staged_diff()?;
        if diff.trim().is_empty() {
            session
                .terminal
                .write_line("\nNo staged changes to analyze for AI insights.")?;
            return Ok(0);
        }

        let prompt = session.prompts.status_prompt(&diff);
        let request = SuggestionRequest::status_insight(prompt);
        match session.provider.generate(session.config, &request).await {
            Ok(insights) => {
                session.terminal.write_line("\nAI insights:")?;
                session.terminal.write_line(insights.first())?;
            }
            Err(e) => {
                debug!(error = %e, "could not generate status insights");
                session
                    .terminal
                    .write_line(&format!("\n[Warning: Could not generate AI insights: {e}]"))?;
            }
        }
        Ok(0)
    }
}
