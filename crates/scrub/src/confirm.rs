//! Interactive confirmation
//!
//! Each candidate is decided on its own: `y` deletes it, `n` skips it, anything else
//! asks again about the same path. There is no "all" or "quit" answer.

use std::fmt;
use std::io::{self, BufRead, Stderr, Stdin, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};

/// An answer to a single prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unrecognized,
}

impl Answer {
    /// Only the first non-blank character counts, case-insensitively
    pub fn parse(line: &str) -> Self {
        match line.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('y') => Answer::Yes,
            Some('n') => Answer::No,
            _ => Answer::Unrecognized,
        }
    }
}

/// Outcome of confirming a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decisions {
    pub approved: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Prompts the user and reports progress.
///
/// Prompts and results go to `output`, problems with single items to `errors`.
pub struct ConfirmationGate<R, W, E = Stderr> {
    input: R,
    output: W,
    errors: E,
    closed: bool,
}

impl ConfirmationGate<StdinLock<'static>, Stdout> {
    /// Gate on the process' stdin, stdout and stderr
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConfirmationGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self::with_errors(input, output, io::stderr())
    }
}

impl<R: BufRead, W: Write, E: Write> ConfirmationGate<R, W, E> {
    pub fn with_errors(input: R, output: W, errors: E) -> Self {
        Self {
            input,
            output,
            errors,
            closed: false,
        }
    }

    /// Decide every candidate. With `force` everything is approved without a prompt.
    pub fn resolve<'p, I>(&mut self, candidates: I, force: bool) -> io::Result<Decisions>
    where
        I: IntoIterator<Item = &'p PathBuf>,
    {
        let mut decisions = Decisions::default();
        for candidate in candidates {
            if force || self.confirm(candidate)? {
                decisions.approved.push(candidate.clone());
            } else {
                decisions.skipped.push(candidate.clone());
            }
        }
        Ok(decisions)
    }

    /// Ask about one path until a usable answer arrives.
    ///
    /// Once input is exhausted every further candidate is skipped.
    pub fn confirm(&mut self, path: &Path) -> io::Result<bool> {
        loop {
            if self.closed {
                writeln!(self.output, "No input, skipping {}", path.display())?;
                return Ok(false);
            }

            write!(self.output, "Delete {}? (Y/n) ", path.display())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                self.closed = true;
                writeln!(self.output)?;
                continue;
            }

            match Answer::parse(&line) {
                Answer::Yes => return Ok(true),
                Answer::No => {
                    writeln!(self.output, "Skipping {}", path.display())?;
                    return Ok(false);
                }
                Answer::Unrecognized => writeln!(self.output, "Unrecognized input.")?,
            }
        }
    }

    /// Print an informational line
    pub fn say(&mut self, message: impl fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    /// Report a problem with a single item
    pub fn warn(&mut self, message: impl fmt::Display) -> io::Result<()> {
        writeln!(self.errors, "{}", message)
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn errors(&self) -> &E {
        &self.errors
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
