//! Line-oriented prompting with bounded re-prompts.
//!
//! # Responsibility
//! - Read one answer per line, re-prompting on invalid input.
//! - Treat `quit`/`exit`/`cancel` and end of input as cancelling the
//!   current operation.
//!
//! # Invariants
//! - A prompt is shown at most `max_attempts` times per question.

use chinook_core::{validate_option, ValidationResult};
use std::io::{self, BufRead, Write};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const CANCEL_WORDS: &[&str] = &["quit", "exit", "cancel"];
const CONFIRM_ANSWERS: &[&str] = &["yes", "no", "y", "n"];

/// Outcome of a question that may be skipped with an empty line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    Value(T),
    Keep,
    Cancelled,
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
    max_attempts: u32,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Writes a full line to the output.
    pub fn say(&mut self, message: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", message.as_ref())
    }

    /// Asks until `parse` accepts the answer.
    ///
    /// Returns `None` when the user cancels, input ends, or every attempt was
    /// rejected.
    pub fn ask<T>(
        &mut self,
        label: &str,
        mut parse: impl FnMut(&str) -> ValidationResult<T>,
    ) -> io::Result<Option<T>> {
        match self.ask_inner(label, false, &mut parse)? {
            Answer::Value(value) => Ok(Some(value)),
            Answer::Keep | Answer::Cancelled => Ok(None),
        }
    }

    /// Like [`Self::ask`], but an empty line answers [`Answer::Keep`].
    pub fn ask_or_keep<T>(
        &mut self,
        label: &str,
        mut parse: impl FnMut(&str) -> ValidationResult<T>,
    ) -> io::Result<Answer<T>> {
        self.ask_inner(label, true, &mut parse)
    }

    /// Asks a yes/no question. Cancelling counts as "no".
    pub fn confirm(&mut self, label: &str) -> io::Result<bool> {
        let answer = self.ask(label, |raw| validate_option(raw, "Answer", CONFIRM_ANSWERS))?;
        Ok(matches!(answer, Some("yes") | Some("y")))
    }

    fn ask_inner<T>(
        &mut self,
        label: &str,
        allow_keep: bool,
        parse: &mut dyn FnMut(&str) -> ValidationResult<T>,
    ) -> io::Result<Answer<T>> {
        for attempt in 1..=self.max_attempts {
            let Some(line) = self.read_line(label)? else {
                return Ok(Answer::Cancelled);
            };
            if allow_keep && line.trim().is_empty() {
                return Ok(Answer::Keep);
            }

            match parse(&line) {
                Ok(value) => return Ok(Answer::Value(value)),
                Err(err) => {
                    let remaining = self.max_attempts - attempt;
                    if remaining > 0 {
                        writeln!(
                            self.output,
                            "Error: {err}. Please try again (attempts left: {remaining})."
                        )?;
                    } else {
                        writeln!(self.output, "Error: {err}.")?;
                    }
                }
            }
        }

        writeln!(self.output, "Too many invalid attempts. Operation cancelled.")?;
        Ok(Answer::Cancelled)
    }

    /// Shows `label` and reads one line; `None` on end of input or a cancel
    /// word.
    fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }

        let line = line.trim_end_matches(['\r', '\n']).to_string();
        if CANCEL_WORDS
            .iter()
            .any(|word| word.eq_ignore_ascii_case(line.trim()))
        {
            writeln!(self.output, "Operation cancelled.")?;
            return Ok(None);
        }
        Ok(Some(line))
    }
}
