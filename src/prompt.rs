//! Interactive prompting.
//!
//! Library code asks questions through the [`Prompt`] trait. The binary uses
//! [`TerminalPrompt`] when a user is attached and [`NonInteractive`]
//! otherwise, so a missing answer surfaces as an error instead of a hang.
use std::io::{self, IsTerminal as _};

use inquire::{Confirm, Password, PasswordDisplayMode, Text};

/// Source of answers to interactive questions.
pub trait Prompt {
    /// Ask for a line of text.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer can be obtained.
    fn input(&self, prompt: &str) -> io::Result<String>;

    /// Ask for a secret without echo. With `confirm`, the value is asked
    /// twice and must match.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer can be obtained.
    fn password(&self, prompt: &str, confirm: bool) -> io::Result<String>;

    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer can be obtained.
    fn confirm(&self, prompt: &str, default: bool) -> io::Result<bool>;

    /// Whether a human can answer questions.
    fn is_interactive(&self) -> bool {
        true
    }
}

fn to_io(e: inquire::InquireError) -> io::Error {
    io::Error::other(e.to_string())
}

/// [`Prompt`] backed by the terminal. Questions render on stderr, so stdout
/// stays usable for `eval "$(...)"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn input(&self, prompt: &str) -> io::Result<String> {
        Text::new(prompt).prompt().map_err(to_io)
    }

    fn password(&self, prompt: &str, confirm: bool) -> io::Result<String> {
        let question = Password::new(prompt).with_display_mode(PasswordDisplayMode::Hidden);
        let question = if confirm {
            question
                .with_custom_confirmation_message("Confirm password:")
                .with_custom_confirmation_error_message("Passwords do not match")
        } else {
            question.without_confirmation()
        };
        question.prompt().map_err(to_io)
    }

    fn confirm(&self, prompt: &str, default: bool) -> io::Result<bool> {
        Confirm::new(prompt)
            .with_default(default)
            .prompt()
            .map_err(to_io)
    }
}

/// [`Prompt`] for unattended runs: text questions fail and confirmations
/// take their default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Prompt for NonInteractive {
    fn input(&self, prompt: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::NotConnected,
            format!("no terminal to answer '{prompt}'"),
        ))
    }

    fn password(&self, prompt: &str, _confirm: bool) -> io::Result<String> {
        self.input(prompt)
    }

    fn confirm(&self, _prompt: &str, default: bool) -> io::Result<bool> {
        Ok(default)
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Pick [`TerminalPrompt`] when stdin and stderr are attached to a user.
#[must_use]
pub fn for_terminal() -> Box<dyn Prompt> {
    if io::stdin().is_terminal() && io::stderr().is_terminal() {
        Box::new(TerminalPrompt)
    } else {
        Box::new(NonInteractive)
    }
}

/// Scripted answers for unit tests.
#[cfg(test)]
pub mod test_helpers {
    use super::Prompt;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;

    /// Answers questions from fixed queues and records every question.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompt {
        inputs: RefCell<VecDeque<String>>,
        passwords: RefCell<VecDeque<String>>,
        confirms: RefCell<VecDeque<bool>>,
        asked: RefCell<Vec<String>>,
    }

    impl ScriptedPrompt {
        /// Empty script; every question fails.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue text answers.
        #[must_use]
        pub fn inputs(self, answers: &[&str]) -> Self {
            self.inputs
                .borrow_mut()
                .extend(answers.iter().map(ToString::to_string));
            self
        }

        /// Queue password answers.
        #[must_use]
        pub fn passwords(self, answers: &[&str]) -> Self {
            self.passwords
                .borrow_mut()
                .extend(answers.iter().map(ToString::to_string));
            self
        }

        /// Queue confirmation answers.
        #[must_use]
        pub fn confirms(self, answers: &[bool]) -> Self {
            self.confirms.borrow_mut().extend(answers.iter().copied());
            self
        }

        /// Every question asked so far.
        #[must_use]
        pub fn asked(&self) -> Vec<String> {
            self.asked.borrow().clone()
        }

        fn exhausted(prompt: &str) -> io::Error {
            io::Error::new(io::ErrorKind::UnexpectedEof, format!("unscripted: {prompt}"))
        }
    }

    impl Prompt for ScriptedPrompt {
        fn input(&self, prompt: &str) -> io::Result<String> {
            self.asked.borrow_mut().push(prompt.to_string());
            self.inputs
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| Self::exhausted(prompt))
        }

        fn password(&self, prompt: &str, _confirm: bool) -> io::Result<String> {
            self.asked.borrow_mut().push(prompt.to_string());
            self.passwords
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| Self::exhausted(prompt))
        }

        fn confirm(&self, prompt: &str, _default: bool) -> io::Result<bool> {
            self.asked.borrow_mut().push(prompt.to_string());
            self.confirms
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| Self::exhausted(prompt))
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::test_helpers::ScriptedPrompt;
    use super::*;

    #[test]
    fn non_interactive_input_fails() {
        let err = NonInteractive.input("Environment name").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert!(err.to_string().contains("Environment name"));
    }

    #[test]
    fn non_interactive_confirm_takes_default() {
        assert!(!NonInteractive.confirm("Remove?", false).unwrap());
        assert!(NonInteractive.confirm("Continue?", true).unwrap());
        assert!(!NonInteractive.is_interactive());
    }

    #[test]
    fn scripted_prompt_answers_in_order() {
        let prompt = ScriptedPrompt::new()
            .inputs(&["alice", "bob"])
            .confirms(&[true]);
        assert_eq!(prompt.input("first").unwrap(), "alice");
        assert_eq!(prompt.input("second").unwrap(), "bob");
        assert!(prompt.confirm("ok?", false).unwrap());
        assert!(prompt.input("third").is_err());
        assert_eq!(prompt.asked(), vec!["first", "second", "ok?", "third"]);
    }
}
