use std::io::{self, BufRead, Write};

use qa_session::Confirm;

/// y/N question on the terminal. Anything but `y`/`yes` declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
