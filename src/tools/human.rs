//! Ask the person at the terminal
//!
//! Backs the `ask_human` tool so the agent can request information it cannot
//! find on the page (logins, preferences, confirmation).

use async_trait::async_trait;
use std::io::{self, BufRead, Write};

use crate::core::{PilotError, Result};

/// Source of answers to agent questions
#[async_trait]
pub trait HumanInput: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String>;
}

/// Reads answers from stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinHuman;

#[async_trait]
impl HumanInput for StdinHuman {
    async fn ask(&self, question: &str) -> Result<String> {
        let question = question.to_string();
        tokio::task::spawn_blocking(move || -> Result<String> {
            let mut stdout = io::stdout();
            write!(stdout, "\n{}\nInput: ", question)?;
            stdout.flush()?;

            let mut answer = String::new();
            io::stdin().lock().read_line(&mut answer)?;
            Ok(answer.trim().to_string())
        })
        .await
        .map_err(|e| PilotError::task_failed(format!("input task panicked: {}", e)))?
    }
}

/// Fixed answer, for non-interactive runs and tests
#[derive(Debug, Clone)]
pub struct CannedHuman {
    answer: String,
}

impl CannedHuman {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

#[async_trait]
impl HumanInput for CannedHuman {
    async fn ask(&self, question: &str) -> Result<String> {
        tracing::debug!("answering '{}' with canned reply", question);
        Ok(self.answer.clone())
    }
}
