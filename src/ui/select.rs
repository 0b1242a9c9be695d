//! Single-screen list picker.

use std::io;

use super::{Key, Terminal};

const HELP: &str = "Use ↑/↓ arrows to navigate, enter to select";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectInput {
    Up,
    Down,
    Confirm,
    Quit,
}

impl SelectInput {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Up | Key::Char('k') => Some(SelectInput::Up),
            Key::Down | Key::Char('j') => Some(SelectInput::Down),
            Key::Enter => Some(SelectInput::Confirm),
            Key::Esc | Key::Interrupt | Key::Char('q') => Some(SelectInput::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectState {
    Active { cursor: usize },
    Selected(usize),
    Cancelled,
}

impl SelectState {
    pub fn new() -> Self {
        SelectState::Active { cursor: 0 }
    }
}

impl Default for SelectState {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance the picker over a list of `len` options. The cursor is clamped
/// to `0..len` and never wraps. Terminal states absorb every input.
pub fn transition(state: SelectState, input: SelectInput, len: usize) -> SelectState {
    let SelectState::Active { cursor } = state else {
        return state;
    };

    match input {
        SelectInput::Up => SelectState::Active {
            cursor: cursor.saturating_sub(1),
        },
        SelectInput::Down => SelectState::Active {
            cursor: (cursor + 1).min(len.saturating_sub(1)),
        },
        SelectInput::Confirm if len == 0 => SelectState::Cancelled,
        SelectInput::Confirm => SelectState::Selected(cursor),
        SelectInput::Quit => SelectState::Cancelled,
    }
}

/// Picks one entry from `options`. Knows nothing about what the entries mean.
pub struct SelectionPrompt<'a> {
    title: &'a str,
    options: &'a [String],
}

impl<'a> SelectionPrompt<'a> {
    pub fn new(title: &'a str, options: &'a [String]) -> Self {
        Self { title, options }
    }

    pub fn render(&self, cursor: usize) -> String {
        let mut frame = format!("{}\n\n", self.title);
        for (i, option) in self.options.iter().enumerate() {
            let marker = if i == cursor { "> " } else { "  " };
            frame.push_str(marker);
            frame.push_str(option);
            frame.push('\n');
        }
        frame.push('\n');
        frame.push_str(HELP);
        frame
    }

    /// Index of the chosen option in display order, or `None` when the user
    /// quit or input ended.
    pub fn run(&self, terminal: &mut dyn Terminal) -> io::Result<Option<usize>> {
        let mut state = SelectState::new();

        while let SelectState::Active { cursor } = state {
            terminal.draw(&self.render(cursor))?;
            let Some(key) = terminal.read_key()? else {
                state = SelectState::Cancelled;
                break;
            };
            if let Some(input) = SelectInput::from_key(key) {
                state = transition(state, input, self.options.len());
            }
        }

        terminal.finish()?;
        Ok(match state {
            SelectState::Selected(index) => Some(index),
            _ => None,
        })
    }
}
