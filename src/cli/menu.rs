//! Numbered interactive menu driving a [`DomService`]
//!
//! Input and output are injected, so the same loop serves a terminal session,
//! a script file and tests.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, instrument, warn};

use crate::application::services::DomService;
use crate::application::ApplicationResult;
use crate::cli::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    Remove,
    View,
    Edit,
    Move,
    Display,
    Save,
    Count,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 9] = [
        MenuChoice::Add,
        MenuChoice::Remove,
        MenuChoice::View,
        MenuChoice::Edit,
        MenuChoice::Move,
        MenuChoice::Display,
        MenuChoice::Save,
        MenuChoice::Count,
        MenuChoice::Exit,
    ];

    /// Menu numbers start at 1.
    pub fn from_number(n: u64) -> Option<Self> {
        let pos = usize::try_from(n).ok()?.checked_sub(1)?;
        Self::ALL.get(pos).copied()
    }

    pub fn number(self) -> usize {
        Self::ALL.iter().position(|&c| c == self).unwrap_or(0) + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Add => "Add Element",
            MenuChoice::Remove => "Remove Element",
            MenuChoice::View => "View Element Content",
            MenuChoice::Edit => "Edit Element Content",
            MenuChoice::Move => "Move Element",
            MenuChoice::Display => "Display DOM",
            MenuChoice::Save => "Save DOM to File",
            MenuChoice::Count => "Count Total Elements",
            MenuChoice::Exit => "Exit",
        }
    }
}

/// Result of validating one token of menu input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceInput {
    Choice(MenuChoice),
    /// A digit sequence that names no menu entry
    OutOfRange,
    /// Anything that is not a non-empty digit sequence
    NotANumber,
}

/// Validates a menu token: only a non-empty run of ASCII digits is parsed as a number.
pub fn parse_choice(token: &str) -> ChoiceInput {
    let token = token.trim();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return ChoiceInput::NotANumber;
    }
    token
        .parse::<u64>()
        .ok()
        .and_then(MenuChoice::from_number)
        .map_or(ChoiceInput::OutOfRange, ChoiceInput::Choice)
}

pub struct Menu<R, W> {
    service: DomService,
    input: R,
    out: W,
    save_file: PathBuf,
    outline: bool,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(service: DomService, input: R, out: W, save_file: PathBuf) -> Self {
        Self {
            service,
            input,
            out,
            save_file,
            outline: false,
        }
    }

    /// Display the tree as a `termtree` outline instead of indented markup.
    pub fn with_outline(mut self, outline: bool) -> Self {
        self.outline = outline;
        self
    }

    pub fn service(&self) -> &DomService {
        &self.service
    }

    pub fn into_parts(self) -> (DomService, W) {
        (self.service, self.out)
    }

    /// Runs until Exit is chosen or the input ends.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            match self.read_choice()? {
                None => {
                    debug!("input exhausted");
                    break;
                }
                Some(ChoiceInput::Choice(choice)) => {
                    debug!(?choice, "menu choice");
                    if !self.dispatch(choice)? {
                        break;
                    }
                }
                Some(_) => output::error(&mut self.out, "Invalid choice. Please try again.")?,
            }
        }
        Ok(())
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        output::header(&mut self.out, "--- DOM Visualizer Menu ---")?;
        for choice in MenuChoice::ALL {
            output::info(
                &mut self.out,
                &format!("{}. {}", choice.number(), choice.label()),
            )?;
        }
        output::info(&mut self.out, "---------------------------")
    }

    /// Re-prompts until the token is a digit sequence. `None` at end of input.
    fn read_choice(&mut self) -> io::Result<Option<ChoiceInput>> {
        loop {
            let Some(token) = self.ask_token("Enter your choice:")? else {
                return Ok(None);
            };
            match parse_choice(&token) {
                ChoiceInput::NotANumber => output::error(
                    &mut self.out,
                    "Invalid input, please enter a valid number",
                )?,
                other => return Ok(Some(other)),
            }
        }
    }

    /// Next input line without its terminator. Invalid UTF-8 is replaced, not rejected.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// First whitespace-delimited token, skipping blank lines.
    fn ask_token(&mut self, prompt: &str) -> io::Result<Option<String>> {
        output::prompt(&mut self.out, prompt)?;
        while let Some(line) = self.read_line()? {
            if let Some(token) = line.split_whitespace().next() {
                return Ok(Some(token.to_string()));
            }
        }
        Ok(None)
    }

    /// Whole line, may be empty.
    fn ask_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        output::prompt(&mut self.out, prompt)?;
        self.read_line()
    }

    fn report<T>(
        &mut self,
        result: ApplicationResult<T>,
        on_ok: impl FnOnce(T) -> String,
    ) -> io::Result<()> {
        match result {
            Ok(value) => output::success(&mut self.out, &on_ok(value)),
            Err(e) => {
                warn!(error = %e, "operation failed");
                output::error(&mut self.out, &e)
            }
        }
    }

    /// Executes one menu entry. Returns false when the session should end.
    fn dispatch(&mut self, choice: MenuChoice) -> io::Result<bool> {
        match choice {
            MenuChoice::Add => {
                let Some(parent) = self.ask_token("Enter parent tag:")? else {
                    return Ok(false);
                };
                let Some(tag) = self.ask_token("Enter tag to add:")? else {
                    return Ok(false);
                };
                let Some(content) = self.ask_line("Enter content (optional):")? else {
                    return Ok(false);
                };
                let result = self.service.add(&parent, &tag, &content);
                self.report(result, |_| format!("Added <{}> under <{}>", tag, parent))?;
            }
            MenuChoice::Remove => {
                let Some(tag) = self.ask_token("Enter tag to remove:")? else {
                    return Ok(false);
                };
                let result = self.service.remove(&tag);
                self.report(result, |n| format!("Removed <{}> ({} elements)", tag, n))?;
            }
            MenuChoice::View => {
                let Some(tag) = self.ask_token("Enter tag to view content:")? else {
                    return Ok(false);
                };
                match self.service.view(&tag).map(str::to_string) {
                    Ok(content) => {
                        output::info(&mut self.out, &format!("Content of <{}>: {}", tag, content))?
                    }
                    Err(e) => self.report::<()>(Err(e), |_| String::new())?,
                }
            }
            MenuChoice::Edit => {
                let Some(tag) = self.ask_token("Enter tag to edit:")? else {
                    return Ok(false);
                };
                let Some(content) = self.ask_line("Enter new content:")? else {
                    return Ok(false);
                };
                let result = self.service.edit(&tag, &content);
                self.report(result, |_| "Content updated".to_string())?;
            }
            MenuChoice::Move => {
                let Some(tag) = self.ask_token("Enter tag to move:")? else {
                    return Ok(false);
                };
                let Some(parent) = self.ask_token("Enter new parent tag:")? else {
                    return Ok(false);
                };
                let result = self.service.move_node(&tag, &parent);
                self.report(result, |_| format!("Moved <{}> under <{}>", tag, parent))?;
            }
            MenuChoice::Display => {
                let result = if self.outline {
                    self.service.display_outline(&mut self.out)
                } else {
                    self.service.display(&mut self.out)
                };
                if let Err(e) = result {
                    self.report::<()>(Err(e), |_| String::new())?;
                }
            }
            MenuChoice::Save => {
                let result = self.service.save(&self.save_file);
                self.report(result, |path| {
                    format!("DOM saved to file: {}", path.display())
                })?;
            }
            MenuChoice::Count => {
                let count = self.service.count();
                output::info(&mut self.out, &format!("Total elements: {}", count))?;
            }
            MenuChoice::Exit => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", ChoiceInput::Choice(MenuChoice::Add))]
    #[case(" 9 ", ChoiceInput::Choice(MenuChoice::Exit))]
    #[case("08", ChoiceInput::Choice(MenuChoice::Count))]
    #[case("0", ChoiceInput::OutOfRange)]
    #[case("10", ChoiceInput::OutOfRange)]
    #[case("99999999999999999999999", ChoiceInput::OutOfRange)]
    #[case("", ChoiceInput::NotANumber)]
    #[case("-1", ChoiceInput::NotANumber)]
    #[case("2a", ChoiceInput::NotANumber)]
    #[case("one", ChoiceInput::NotANumber)]
    fn given_token_when_parsing_choice_then_classifies(
        #[case] token: &str,
        #[case] expected: ChoiceInput,
    ) {
        assert_eq!(parse_choice(token), expected);
    }

    #[test]
    fn given_all_choices_then_numbers_are_one_based_and_round_trip() {
        for (i, choice) in MenuChoice::ALL.iter().enumerate() {
            assert_eq!(choice.number(), i + 1);
            assert_eq!(MenuChoice::from_number(i as u64 + 1), Some(*choice));
        }
    }
}
