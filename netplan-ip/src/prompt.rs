use std::io::{self, BufRead, Write};

use colored::Colorize;
use netplan_core::ValidationError;
use thiserror::Error;

/// Answer that aborts any prompt.
pub const ABORT_ANSWER: &str = "q";

/// Errors raised while prompting.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Line-oriented question/answer loop over arbitrary streams.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line without expecting an answer.
    pub fn say(&mut self, line: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Ask once and return the trimmed answer.
    ///
    /// End of input and the answer `q` abort.
    pub fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(ValidationError::Aborted.into());
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case(ABORT_ANSWER) {
            return Err(ValidationError::Aborted.into());
        }
        Ok(answer.to_string())
    }

    /// Ask until `check` accepts the answer, reporting each rejection.
    pub fn ask_until<T>(
        &mut self,
        question: &str,
        mut check: impl FnMut(&str) -> Result<T, ValidationError>,
    ) -> Result<T, PromptError> {
        loop {
            let answer = self.ask(question)?;
            match check(&answer) {
                Ok(value) => return Ok(value),
                Err(err) => self.say(&format!("{} {err}", "[-]".red()))?,
            }
        }
    }

    /// Yes/no question defaulting to no.
    pub fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        let answer = self.ask(&format!("{question} [y/N]: "))?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
