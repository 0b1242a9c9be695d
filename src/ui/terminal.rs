use std::io::{self, BufRead, Stdout, Write};

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{execute, queue};

use super::{Key, Terminal};

const FALLBACK_WIDTH: u16 = 80;

/// Restores cooked mode when dropped, including on early return.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// `Terminal` on the process's stdin/stdout. Raw mode is on only between
/// the first `draw`/`read_key` of a prompt and its `finish`.
pub struct CrosstermTerminal {
    stdout: Stdout,
    raw: Option<RawModeGuard>,
    /// Screen rows occupied by the frame currently on screen, counting
    /// wrapped lines.
    drawn: u16,
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            raw: None,
            drawn: 0,
        }
    }

    fn ensure_raw(&mut self) -> io::Result<()> {
        if self.raw.is_none() {
            self.raw = Some(RawModeGuard::enable()?);
        }
        Ok(())
    }
}

/// Rows `frame` takes up on a terminal `cols` wide once long lines wrap.
fn screen_rows(frame: &str, cols: u16) -> u16 {
    let cols = usize::from(cols.max(1));
    let rows: usize = frame
        .lines()
        .map(|line| line.chars().count().div_ceil(cols).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn map_key(event: KeyEvent) -> Option<Option<Key>> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') => Some(Some(Key::Interrupt)),
            // Ctrl-D ends input.
            KeyCode::Char('d') => Some(None),
            _ => None,
        };
    }
    let key = match event.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    };
    Some(Some(key))
}

impl Terminal for CrosstermTerminal {
    fn read_key(&mut self) -> io::Result<Option<Key>> {
        self.ensure_raw()?;
        loop {
            if let Event::Key(key) = event::read()? {
                if let Some(mapped) = map_key(key) {
                    return Ok(mapped);
                }
            }
        }
    }

    fn draw(&mut self, frame: &str) -> io::Result<()> {
        self.ensure_raw()?;
        queue!(self.stdout, MoveToColumn(0))?;
        if self.drawn > 1 {
            queue!(self.stdout, MoveUp(self.drawn - 1))?;
        }
        queue!(self.stdout, Clear(ClearType::FromCursorDown))?;

        // Raw mode does not translate `\n`.
        let lines: Vec<&str> = frame.lines().collect();
        write!(self.stdout, "{}", lines.join("\r\n"))?;
        self.stdout.flush()?;

        let cols = terminal::size().map_or(FALLBACK_WIDTH, |(cols, _)| cols);
        self.drawn = screen_rows(frame, cols);
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.drawn > 0 {
            execute!(self.stdout, crossterm::style::Print("\r\n"))?;
            self.drawn = 0;
        }
        // Dropping the guard leaves raw mode.
        self.raw = None;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.finish()?;
        write!(self.stdout, "{prompt}")?;
        self.stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.finish()?;
        writeln!(self.stdout, "{text}")
    }
}
