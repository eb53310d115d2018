//! Scoped raw-mode handling for single keypress prompts.
//!
//! Raw mode is enabled by [`RawModeGuard::acquire`] and restored when the
//! guard drops, on normal return, early `?` return and unwinding alike.

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled};

pub struct RawModeGuard {
    was_enabled: bool,
}

impl RawModeGuard {
    pub fn acquire() -> io::Result<Self> {
        let was_enabled = is_raw_mode_enabled()?;
        if !was_enabled {
            enable_raw_mode()?;
        }
        Ok(Self { was_enabled })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.was_enabled {
            // Errors cannot be reported from drop.
            let _ = disable_raw_mode();
        }
    }
}

/// Blocks for one key press. Ctrl+C is reported as `None`.
pub fn read_key() -> io::Result<Option<KeyCode>> {
    let _guard = RawModeGuard::acquire()?;
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            return Ok(interpret(key));
        }
    }
}

fn interpret(key: KeyEvent) -> Option<KeyCode> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        None
    } else {
        Some(key.code)
    }
}

/// Prints `prompt [y/N]` and waits for a single key. Only `y`/`Y` confirms.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let key = read_key()?;
    println!();
    Ok(matches!(key, Some(KeyCode::Char('y')) | Some(KeyCode::Char('Y'))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_ctrl_c() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(interpret(ctrl_c), None);

        let plain_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(interpret(plain_c), Some(KeyCode::Char('c')));

        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(interpret(enter), Some(KeyCode::Enter));
    }
}
