//! Interactive credential setup.
//!
//! Flow: pick a provider by number, enter each of its credential fields in
//! order, then confirm. Esc while typing starts over, as does `n`, Esc or
//! Ctrl-C at the confirmation.

use crate::config::ProviderConfig;
use crate::error::CommandError;
use crate::provider::ProviderSpec;

use super::{Key, Terminal};

const MASK: char = '*';
const VISIBLE_PREFIX: usize = 4;

/// Answers keyed by field label, in the order they were entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardAnswers(Vec<(&'static str, String)>);

impl WizardAnswers {
    fn record(&mut self, label: &'static str, value: String) {
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(l, v)| (*l, v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    ProviderSelection,
    InputCredential {
        provider: &'static ProviderSpec,
        /// Index into `provider.fields` of the field being typed.
        field: usize,
        buffer: String,
        answers: WizardAnswers,
    },
    Confirm {
        provider: &'static ProviderSpec,
        answers: WizardAnswers,
    },
    Done {
        provider: &'static ProviderSpec,
        answers: WizardAnswers,
    },
    Cancelled,
}

impl WizardState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardState::Done { .. } | WizardState::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardInput {
    Char(char),
    Backspace,
    /// Enter.
    Submit,
    /// Esc: start over.
    Back,
    /// Ctrl-C: abandon setup, or start over from the confirm screen.
    Quit,
}

impl WizardInput {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Char(c) => Some(WizardInput::Char(c)),
            Key::Backspace => Some(WizardInput::Backspace),
            Key::Enter => Some(WizardInput::Submit),
            Key::Esc => Some(WizardInput::Back),
            Key::Interrupt => Some(WizardInput::Quit),
            Key::Up | Key::Down => None,
        }
    }
}

/// Advance the wizard. `providers` is the numbered menu, where `1` picks
/// `providers[0]`.
pub fn transition(
    state: WizardState,
    input: WizardInput,
    providers: &[&'static ProviderSpec],
) -> WizardState {
    match state {
        WizardState::ProviderSelection => match input {
            WizardInput::Char('q') | WizardInput::Back | WizardInput::Quit => {
                WizardState::Cancelled
            }
            WizardInput::Char(c) => match menu_choice(c, providers) {
                Some(provider) => begin(provider),
                None => WizardState::ProviderSelection,
            },
            _ => WizardState::ProviderSelection,
        },

        WizardState::InputCredential {
            provider,
            field,
            mut buffer,
            mut answers,
        } => match input {
            WizardInput::Char(c) => {
                buffer.push(c);
                WizardState::InputCredential {
                    provider,
                    field,
                    buffer,
                    answers,
                }
            }
            WizardInput::Backspace => {
                buffer.pop();
                WizardState::InputCredential {
                    provider,
                    field,
                    buffer,
                    answers,
                }
            }
            WizardInput::Submit if buffer.trim().is_empty() => WizardState::InputCredential {
                provider,
                field,
                buffer,
                answers,
            },
            WizardInput::Submit => {
                answers.record(provider.fields[field].label, buffer.trim().to_string());
                let next = field + 1;
                if next < provider.fields.len() {
                    WizardState::InputCredential {
                        provider,
                        field: next,
                        buffer: String::new(),
                        answers,
                    }
                } else {
                    WizardState::Confirm { provider, answers }
                }
            }
            WizardInput::Back => WizardState::ProviderSelection,
            WizardInput::Quit => WizardState::Cancelled,
        },

        WizardState::Confirm { provider, answers } => match input {
            WizardInput::Char('y' | 'Y') | WizardInput::Submit => {
                WizardState::Done { provider, answers }
            }
            WizardInput::Char('n' | 'N') | WizardInput::Back | WizardInput::Quit => {
                WizardState::ProviderSelection
            }
            _ => WizardState::Confirm { provider, answers },
        },

        terminal @ (WizardState::Done { .. } | WizardState::Cancelled) => terminal,
    }
}

fn menu_choice(c: char, providers: &[&'static ProviderSpec]) -> Option<&'static ProviderSpec> {
    let n = c.to_digit(10)? as usize;
    n.checked_sub(1).and_then(|i| providers.get(i)).copied()
}

fn begin(provider: &'static ProviderSpec) -> WizardState {
    if provider.fields.is_empty() {
        return WizardState::Confirm {
            provider,
            answers: WizardAnswers::default(),
        };
    }
    WizardState::InputCredential {
        provider,
        field: 0,
        buffer: String::new(),
        answers: WizardAnswers::default(),
    }
}

/// Display form of a credential. Values whose label mentions a key or token
/// show only their first four characters; shorter values are fully masked.
pub fn mask(label: &str, value: &str) -> String {
    let label = label.to_lowercase();
    if !(label.contains("key") || label.contains("token")) {
        return value.to_string();
    }

    let len = value.chars().count();
    if len <= VISIBLE_PREFIX {
        return MASK.to_string().repeat(len);
    }
    let prefix: String = value.chars().take(VISIBLE_PREFIX).collect();
    let hidden = MASK.to_string().repeat(len - VISIBLE_PREFIX);
    format!("{prefix}{hidden}")
}

fn number_hint(n: usize) -> String {
    let numbers: Vec<String> = (1..=n).map(|i| i.to_string()).collect();
    match numbers.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

pub fn render(state: &WizardState, providers: &[&'static ProviderSpec]) -> String {
    let mut s = String::new();

    match state {
        WizardState::ProviderSelection => {
            s.push_str("Select AI Provider:\n\n");
            for (i, provider) in providers.iter().enumerate() {
                s.push_str(&format!("{}. {}\n", i + 1, provider.display_name));
            }
            s.push_str(&format!(
                "\nPress {} to select a provider (ESC to cancel)",
                number_hint(providers.len())
            ));
        }

        WizardState::InputCredential {
            provider,
            field,
            buffer,
            ..
        } => {
            s.push_str(&format!("Setting up {}\n\n", provider.display_name));
            for (i, f) in provider.fields.iter().enumerate() {
                if i < *field {
                    s.push_str(&format!("✓ {}\n", f.label));
                } else if i == *field {
                    s.push_str(&format!("> {}: {}\n", f.label, buffer));
                } else {
                    s.push_str(&format!("  {}\n", f.label));
                }
            }
            s.push_str("\nPress ENTER to confirm (ESC to start over)");
        }

        WizardState::Confirm { provider, answers } => {
            s.push_str("Please confirm your configuration:\n\n");
            s.push_str(&format!("AI Provider: {}\n", provider.display_name));
            for (label, value) in answers.iter() {
                s.push_str(&format!("{}: {}\n", label, mask(label, value)));
            }
            s.push_str("\nConfirm? (Y/n): ");
        }

        WizardState::Done { .. } | WizardState::Cancelled => {}
    }

    s
}

/// Runs the wizard against a terminal.
pub struct CredentialWizard {
    providers: Vec<&'static ProviderSpec>,
}

impl CredentialWizard {
    pub fn new(providers: Vec<&'static ProviderSpec>) -> Self {
        Self { providers }
    }

    /// The configuration built from the confirmed answers together with the
    /// provider it is for. Anything short of confirmation is
    /// `Cancelled("setup cancelled")`.
    pub fn run(
        &self,
        terminal: &mut dyn Terminal,
    ) -> Result<(ProviderConfig, &'static ProviderSpec), CommandError> {
        let mut state = WizardState::ProviderSelection;

        while !state.is_terminal() {
            terminal.draw(&render(&state, &self.providers))?;
            let Some(key) = terminal.read_key()? else {
                state = WizardState::Cancelled;
                break;
            };
            if let Some(input) = WizardInput::from_key(key) {
                state = transition(state, input, &self.providers);
            }
        }

        terminal.finish()?;
        match state {
            WizardState::Done { provider, answers } => {
                Ok((build_config(provider, &answers), provider))
            }
            _ => Err(CommandError::Cancelled("setup cancelled")),
        }
    }
}

fn build_config(provider: &'static ProviderSpec, answers: &WizardAnswers) -> ProviderConfig {
    let mut config = ProviderConfig::new(provider.name);
    for field in provider.fields {
        if let Some(value) = answers.get(field.label) {
            config.set(field.key, value);
        }
    }
    config
}
