//! Three-way confirmation prompts.
//!
//! Every destructive operation asks through a [`Confirm`] provider and gets
//! back exactly one [`Choice`]. The terminal provider reads a line from stdin;
//! the preset provider answers without asking and backs the `--yes`,
//! `--overwrite` and `--merge` flags.

use crate::errors::{AppError, AppResult};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// How the user answered a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Confirmed,
    Cancelled,
    /// Closed without picking either button.
    Dismissed,
}

impl Choice {
    pub fn is_confirmed(self) -> bool {
        self == Choice::Confirmed
    }
}

/// The question put to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    /// Marks an irreversible action.
    pub dangerous: bool,
    /// Whether an empty answer may dismiss the prompt.
    pub backdrop_dismiss: bool,
    /// Offers only the confirm button.
    pub hide_cancel: bool,
}

impl Prompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Prompt {
            title: title.into(),
            message: message.into(),
            confirm_label: "OK".to_string(),
            cancel_label: "Cancel".to_string(),
            dangerous: false,
            backdrop_dismiss: true,
            hide_cancel: false,
        }
    }

    pub fn labels(mut self, confirm: &str, cancel: &str) -> Self {
        self.confirm_label = confirm.to_string();
        self.cancel_label = cancel.to_string();
        self
    }

    pub fn dangerous(mut self) -> Self {
        self.dangerous = true;
        self
    }

    pub fn no_backdrop_dismiss(mut self) -> Self {
        self.backdrop_dismiss = false;
        self
    }

    pub fn confirm_only(mut self) -> Self {
        self.hide_cancel = true;
        self
    }
}

/// Something that can answer a [`Prompt`].
pub trait Confirm {
    /// Asks `prompt` and returns the answer.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the answer could not be read.
    fn ask(&mut self, prompt: &Prompt) -> AppResult<Choice>;
}

/// Answers from a fixed list, then repeats a fallback answer.
#[derive(Debug, Clone)]
pub struct PresetConfirm {
    answers: VecDeque<Choice>,
    fallback: Choice,
    asked: Vec<String>,
}

impl PresetConfirm {
    /// Gives the same answer to every prompt.
    pub fn always(choice: Choice) -> Self {
        PresetConfirm {
            answers: VecDeque::new(),
            fallback: choice,
            asked: Vec::new(),
        }
    }

    /// Gives `answers` in order, then dismisses everything else.
    pub fn sequence<I: IntoIterator<Item = Choice>>(answers: I) -> Self {
        PresetConfirm {
            answers: answers.into_iter().collect(),
            fallback: Choice::Dismissed,
            asked: Vec::new(),
        }
    }

    /// Titles of the prompts answered so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Confirm for PresetConfirm {
    fn ask(&mut self, prompt: &Prompt) -> AppResult<Choice> {
        self.asked.push(prompt.title.clone());
        let choice = self.answers.pop_front().unwrap_or(self.fallback);
        debug!("Preset answer {:?} for '{}'", choice, prompt.title);
        Ok(choice)
    }
}

/// Reads answers line by line.
///
/// `y`/`yes` confirms and `n`/`no` cancels. An empty line dismisses when the
/// prompt allows it, otherwise the question is asked again. End of input
/// always dismisses.
pub struct TerminalConfirm<R, W> {
    input: R,
    output: W,
}

impl TerminalConfirm<io::StdinLock<'static>, io::Stderr> {
    /// Reads stdin and writes prompts to stderr, keeping stdout for results.
    pub fn stdio() -> Self {
        TerminalConfirm::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalConfirm { input, output }
    }

    fn render(&mut self, prompt: &Prompt) -> io::Result<()> {
        let marker = if prompt.dangerous { "!! " } else { "" };
        writeln!(self.output, "{}{}", marker, prompt.title)?;
        if !prompt.message.is_empty() {
            writeln!(self.output, "{}", prompt.message)?;
        }
        if prompt.hide_cancel {
            write!(self.output, "[y] {}: ", prompt.confirm_label)?;
        } else {
            write!(
                self.output,
                "[y] {} / [n] {}: ",
                prompt.confirm_label, prompt.cancel_label
            )?;
        }
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalConfirm<R, W> {
    fn ask(&mut self, prompt: &Prompt) -> AppResult<Choice> {
        self.render(prompt)?;
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(Choice::Dismissed);
            }

            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(Choice::Confirmed),
                "n" | "no" if !prompt.hide_cancel => return Ok(Choice::Cancelled),
                "" if prompt.backdrop_dismiss => return Ok(Choice::Dismissed),
                _ => {
                    let hint = if prompt.hide_cancel {
                        "Please answer y: "
                    } else {
                        "Please answer y or n: "
                    };
                    write!(self.output, "{}", hint)?;
                    self.output.flush()?;
                }
            }
        }
    }
}

/// Maps a cancelled or dismissed answer to `AppError::Cancelled`.
pub fn require(choice: Choice, what: &str) -> AppResult<()> {
    if choice.is_confirmed() {
        Ok(())
    } else {
        Err(AppError::Cancelled(what.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn answer(input: &str, prompt: &Prompt) -> (Choice, String) {
        let mut output = Vec::new();
        let choice = {
            let mut confirm = TerminalConfirm::new(Cursor::new(input.as_bytes()), &mut output);
            confirm.ask(prompt).unwrap()
        };
        (choice, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_terminal_answers() {
        let prompt = Prompt::new("Delete entry?", "This cannot be undone.").labels("Delete", "Keep");

        assert_eq!(answer("y\n", &prompt).0, Choice::Confirmed);
        assert_eq!(answer("YES\n", &prompt).0, Choice::Confirmed);
        assert_eq!(answer("n\n", &prompt).0, Choice::Cancelled);
        assert_eq!(answer("\n", &prompt).0, Choice::Dismissed);
        assert_eq!(answer("", &prompt).0, Choice::Dismissed);

        let (_, shown) = answer("y\n", &prompt);
        assert!(shown.contains("Delete entry?"));
        assert!(shown.contains("[y] Delete / [n] Keep"));
    }

    #[test]
    fn test_terminal_reasks_on_unknown_input() {
        let prompt = Prompt::new("Continue?", "");
        let (choice, shown) = answer("maybe\nn\n", &prompt);
        assert_eq!(choice, Choice::Cancelled);
        assert!(shown.contains("Please answer y or n"));
    }

    #[test]
    fn test_empty_line_needs_backdrop_dismiss() {
        let prompt = Prompt::new("Import mode", "").no_backdrop_dismiss();
        assert_eq!(answer("\nn\n", &prompt).0, Choice::Cancelled);
        // End of input still closes the prompt.
        assert_eq!(answer("\n", &prompt).0, Choice::Dismissed);
    }

    #[test]
    fn test_confirm_only_prompt_ignores_no() {
        let prompt = Prompt::new("Exported", "").confirm_only();
        let (choice, shown) = answer("n\ny\n", &prompt);
        assert_eq!(choice, Choice::Confirmed);
        assert!(!shown.contains("[n]"));
    }

    #[test]
    fn test_preset_sequence_then_dismiss() {
        let mut preset = PresetConfirm::sequence([Choice::Confirmed, Choice::Cancelled]);
        let prompt = Prompt::new("Q", "");
        assert_eq!(preset.ask(&prompt).unwrap(), Choice::Confirmed);
        assert_eq!(preset.ask(&prompt).unwrap(), Choice::Cancelled);
        assert_eq!(preset.ask(&prompt).unwrap(), Choice::Dismissed);
        assert_eq!(preset.asked().len(), 3);
    }

    #[test]
    fn test_require() {
        assert!(require(Choice::Confirmed, "x").is_ok());
        assert!(matches!(
            require(Choice::Dismissed, "delete"),
            Err(AppError::Cancelled(_))
        ));
    }
}
