//! Interaction with the person running the tool.
//!
//! The pipeline never touches stdin directly; it asks an [`Operator`], so runs can
//! be driven from the console or from a script of canned answers.

use console::style;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Answer to a yes / no / yes-to-all question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    YesToAll,
    No,
}

impl Choice {
    /// Interpret a typed answer; blank counts as yes
    pub fn parse(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "a" => Choice::YesToAll,
            "" | "y" | "yes" | "sim" => Choice::Yes,
            _ => Choice::No,
        }
    }
}

/// Something that can answer prompts and receive progress messages
pub trait Operator: Send {
    /// Ask for a line of text; `None` means input is exhausted
    fn ask_text(&mut self, prompt: &str) -> Option<String>;

    /// Show an informational message
    fn notify(&mut self, message: &str);

    /// Ask a yes / no / yes-to-all question; exhausted input counts as yes
    fn ask_yes_no_all(&mut self, prompt: &str) -> Choice {
        match self.ask_text(prompt) {
            Some(answer) => Choice::parse(&answer),
            None => Choice::Yes,
        }
    }
}

/// Operator reading from stdin and writing to stdout
#[derive(Debug, Default)]
pub struct ConsoleOperator;

impl ConsoleOperator {
    pub fn new() -> Self {
        Self
    }
}

impl Operator for ConsoleOperator {
    fn ask_text(&mut self, prompt: &str) -> Option<String> {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "{} ", style(prompt).bold());
        let _ = stdout.flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!("Failed to read operator input: {}", e);
                None
            }
        }
    }

    fn notify(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Operator answering from a fixed list, for non-interactive runs and tests
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    messages: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Prompts asked so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Messages shown so far, in order
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Answers that were never consumed
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Operator for ScriptedOperator {
    fn ask_text(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front()
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parse() {
        assert_eq!(Choice::parse(""), Choice::Yes);
        assert_eq!(Choice::parse(" Y "), Choice::Yes);
        assert_eq!(Choice::parse("yes"), Choice::Yes);
        assert_eq!(Choice::parse("Sim"), Choice::Yes);
        assert_eq!(Choice::parse("A"), Choice::YesToAll);
        assert_eq!(Choice::parse("n"), Choice::No);
        assert_eq!(Choice::parse("maybe"), Choice::No);
    }

    #[test]
    fn test_exhausted_input_means_yes() {
        let mut operator = ScriptedOperator::new(Vec::<String>::new());
        assert_eq!(operator.ask_yes_no_all("Continue?"), Choice::Yes);
        assert_eq!(operator.prompts(), ["Continue?".to_string()]);
    }

    #[test]
    fn test_scripted_operator_records_interaction() {
        let mut operator = ScriptedOperator::new(["n", "pt"]);
        assert_eq!(operator.ask_yes_no_all("Generate?"), Choice::No);
        assert_eq!(operator.ask_text("Language?").as_deref(), Some("pt"));
        assert_eq!(operator.ask_text("More?"), None);

        operator.notify("done");
        assert_eq!(operator.messages(), ["done".to_string()]);
        assert_eq!(operator.prompts().len(), 3);
        assert_eq!(operator.remaining(), 0);
    }
}
