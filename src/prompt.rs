//! Yes/no confirmation before overwriting files.

use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::error::{Error, Result};

/// Asks the user a yes/no question.
pub trait Prompter {
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Prompts on the terminal, defaulting to "no".
///
/// When stdin is not a terminal a single answer line is read from it
/// instead; `y` or `yes` confirms and anything else declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        if std::io::stdin().is_terminal() {
            let theme = ColorfulTheme::default();
            return Confirm::with_theme(&theme)
                .with_prompt(question)
                .default(false)
                .interact()
                .map_err(|e| Error::Io(std::io::Error::other(e)));
        }

        print!("{question} [y/N] ");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(is_yes(&answer))
    }
}

/// Always gives the same answer. For scripted runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Prompter for FixedAnswer {
    fn confirm(&self, question: &str) -> Result<bool> {
        log::debug!("{question} -> {}", if self.0 { "yes" } else { "no" });
        Ok(self.0)
    }
}

/// Ask before replacing the existing `path` unless `forced`. Declining is
/// reported as [`Error::UserCancelled`].
pub fn confirm_overwrite(
    prompter: &dyn Prompter,
    forced: bool,
    what: &str,
    path: &Path,
) -> Result<()> {
    if forced {
        log::debug!("Overwriting {} without asking", path.display());
        return Ok(());
    }
    let question = format!("{what} '{}' already exists. Overwrite?", path.display());
    if prompter.confirm(&question)? {
        Ok(())
    } else {
        Err(Error::UserCancelled)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
