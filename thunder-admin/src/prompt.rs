//! Terminal password prompt and confirmation

use std::io::{self, BufRead, Write};

use thunder_client::CredentialPrompt;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Reads the admin password from a line of stdin
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl CredentialPrompt for StdinPrompt {
    fn prompt(&self, reason: &str) -> Option<String> {
        eprint!("{reason} ");
        io::stderr().flush().ok()?;
        blocking(|| read_answer(&mut io::stdin().lock()))
    }
}

/// Run a terminal read without parking a runtime worker.
///
/// `block_in_place` needs the multi-threaded runtime; anywhere else the
/// read runs inline.
fn blocking<T>(read: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(read)
        }
        _ => read(),
    }
}

/// First line of `input`, trimmed; `None` on EOF, error or blank line
pub fn read_answer(input: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()).filter(|s| !s.is_empty()),
    }
}

/// Ask a yes/no question on the terminal
pub fn confirm(question: &str) -> bool {
    eprint!("{question} [s/N] ");
    if io::stderr().flush().is_err() {
        return false;
    }
    is_yes(blocking(|| read_answer(&mut io::stdin().lock())).as_deref())
}

fn is_yes(answer: Option<&str>) -> bool {
    matches!(
        answer.map(str::to_lowercase).as_deref(),
        Some("s" | "sim" | "y" | "yes")
    )
}
