//! User-facing terminal I/O for the task loop

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::core::Result;

/// Where the task loop reads answers and prints notices
pub trait Prompter {
    /// Show `prompt` and read one line; `None` at end of input
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Print a notice
    fn notify(&mut self, message: &str);

    /// Ask a yes/no question; anything but y/yes declines, as does end of input
    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(match self.read_line(question)? {
            Some(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            None => false,
        })
    }
}

/// Prompter over stdin/stdout
#[derive(Debug, Default)]
pub struct StdioPrompter;

impl Prompter for StdioPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input)? {
            0 => {
                // EOF (Ctrl+D)
                println!();
                Ok(None)
            }
            _ => Ok(Some(input.trim_end_matches(['\r', '\n']).to_string())),
        }
    }

    fn notify(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Replays a fixed list of answers and keeps everything shown
///
/// Runs out like a closed stdin.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Prompts asked, in order
    pub prompts: Vec<String>,
    /// Notices printed, in order
    pub notices: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Whether any notice contains `needle`
    pub fn saw(&self, needle: &str) -> bool {
        self.notices.iter().any(|n| n.contains(needle))
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
