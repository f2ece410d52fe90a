//! "Press any key" console waits.
//!
//! Waits only happen on an interactive terminal; with stdin redirected the
//! message is still printed and the call returns at once.

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{IsTerminal, Write};
use tracing::debug;

/// Blocking key-press prompt used by the deploy and verify flows
pub trait Prompter {
    /// Print `message` and block until a single key is pressed
    fn wait_for_key(&self, message: &str);
}

/// Prompter reading from the real console
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn wait_for_key(&self, message: &str) {
        println!("{message}");
        let _ = std::io::stdout().flush();

        if !std::io::stdin().is_terminal() {
            debug!("stdin is not a terminal, skipping key wait");
            return;
        }

        if let Err(e) = read_one_key() {
            debug!("Key wait aborted: {}", e);
        }
    }
}

fn read_one_key() -> std::io::Result<()> {
    enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };
    // Always leave raw mode, even if reading failed
    let _ = disable_raw_mode();
    result
}
