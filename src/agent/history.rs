//! What an agent run did and what it produced

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::Result;

/// Result text when a run produced nothing usable
pub const NO_RESULT: &str = "No result";

/// One executed action
#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub turn: usize,
    pub action: String,
    pub arguments: serde_json::Value,
    pub success: bool,
    pub output: String,
}

/// Outcome of a full agent run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentHistory {
    /// Actions in execution order
    pub steps: Vec<AgentStep>,
    /// Final answer, or the best partial result when the run stopped early
    pub final_result: Option<String>,
    /// Whether the agent declared the task finished
    pub completed: bool,
    /// Reasoning turns used
    pub turns: usize,
}

impl AgentHistory {
    /// Run that answered directly without any actions
    pub fn answered(answer: impl Into<String>, turns: usize) -> Self {
        Self {
            steps: Vec::new(),
            final_result: Some(answer.into()),
            completed: true,
            turns,
        }
    }

    /// Text handed back to the shell
    pub fn result_text(&self) -> &str {
        self.final_result
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(NO_RESULT)
    }

    /// Write the run as pretty JSON, creating parent directories
    pub fn save_json(&self, task: &str, model: &str, path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct Conversation<'a> {
            task: &'a str,
            model: &'a str,
            #[serde(flatten)]
            history: &'a AgentHistory,
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&Conversation {
            task,
            model,
            history: self,
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// One line per action, for display after a task
    pub fn format_actions(&self) -> String {
        if self.steps.is_empty() {
            return "No actions taken.".to_string();
        }

        self.steps
            .iter()
            .map(|step| {
                let args = match &step.arguments {
                    serde_json::Value::Object(map) if map.is_empty() => String::new(),
                    serde_json::Value::Null => String::new(),
                    other => format!(" {}", other),
                };
                format!(
                    "{} [{}] {}{}",
                    if step.success { "✓" } else { "✗" },
                    step.turn + 1,
                    step.action,
                    args
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
