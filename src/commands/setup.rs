use std::path::PathBuf;

use tracing::info;

use super::Session;
use crate::error::CommandError;
use crate::ui::CredentialWizard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupCommand;

impl SetupCommand {
    pub fn execute(&self, session: &mut Session<'_>) -> Result<PathBuf, CommandError> {
        run_setup(session)
    }
}

/// Run the credential wizard and persist what it collected. Only the chosen
/// provider's keys are written.
pub(crate) fn run_setup(session: &mut Session<'_>) -> Result<PathBuf, CommandError> {
    let wizard = CredentialWizard::new(session.providers.clone());
    let (config, provider) = wizard.run(&mut *session.terminal)?;

    let path = session.store.save(&config, &provider.keys())?;
    info!(provider = provider.name, path = %path.display(), "configuration saved");
    session
        .terminal
        .write_line(&format!("Configuration saved to {}", path.display()))?;
    Ok(path)
}
