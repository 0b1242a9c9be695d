//! Keyboard-driven prompts.
//!
//! The state machines in [`select`] and [`wizard`] are pure values moved
//! forward by `transition`; the drivers read [`Key`]s from a [`Terminal`]
//! and redraw after every keypress.

pub mod select;
pub mod terminal;
pub mod wizard;

use std::io;

pub use select::SelectionPrompt;
pub use terminal::CrosstermTerminal;
pub use wizard::CredentialWizard;

/// A keypress, decoupled from the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Esc,
    Backspace,
    Char(char),
    /// Ctrl-C.
    Interrupt,
}

/// Interactive I/O used by the enhanced commands.
pub trait Terminal {
    /// Next keypress. `Ok(None)` means input has ended.
    fn read_key(&mut self) -> io::Result<Option<Key>>;

    /// Replace the previously drawn frame with `frame`.
    fn draw(&mut self, frame: &str) -> io::Result<()>;

    /// Leave the current frame on screen and return to line mode.
    fn finish(&mut self) -> io::Result<()>;

    /// Print `prompt` and read one line of text, without the line ending.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    fn write_line(&mut self, text: &str) -> io::Result<()>;
}
