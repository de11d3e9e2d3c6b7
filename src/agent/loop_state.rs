//! Agent loop state management
//!
//! Tracks the state of the ReAct reasoning loop including observations from tool executions.

use crate::agent::history::{AgentHistory, AgentStep};
use crate::core::{ToolCall, ToolResult};

/// Longest observation text carried into the next prompt
const MAX_OBSERVATION_CHARS: usize = 6000;

/// State of the agent reasoning loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Current turn number (0-indexed)
    pub turn: usize,
    /// Maximum allowed turns
    pub max_turns: usize,
    /// Observations collected from tool executions
    pub observations: Vec<Observation>,
    /// Final answer if the agent has completed reasoning
    pub final_answer: Option<String>,
}

impl AgentLoopState {
    /// Create a new loop state with the given max turns
    pub fn new(max_turns: usize) -> Self {
        Self {
            turn: 0,
            max_turns,
            observations: Vec::new(),
            final_answer: None,
        }
    }

    /// Check if the loop should continue
    pub fn should_continue(&self) -> bool {
        self.turn < self.max_turns && self.final_answer.is_none()
    }

    /// Format observations for inclusion in the next prompt
    ///
    /// Page snapshots are large, so only the latest observation is shown in
    /// full; earlier ones are cut down.
    pub fn format_observations(&self) -> String {
        if self.observations.is_empty() {
            return String::new();
        }

        let last = self.observations.len() - 1;
        let mut output = String::from("\n\n## Previous actions:\n");
        for (i, obs) in self.observations.iter().enumerate() {
            let limit = if i == last { MAX_OBSERVATION_CHARS } else { 300 };
            output.push_str(&format!(
                "\n### Step {} - {} ({})\n{}\n",
                obs.turn + 1,
                obs.tool_name,
                if obs.success { "ok" } else { "failed" },
                truncate(&obs.output, limit)
            ));
        }
        output
    }

    /// Record the outcome of one tool call in the current turn
    pub fn record(&mut self, call: &ToolCall, result: ToolResult) {
        if result.is_done {
            self.final_answer = Some(result.output.clone());
        }
        self.observations.push(Observation {
            turn: self.turn,
            tool_name: result.tool_name,
            arguments: call.arguments.clone(),
            success: result.success,
            output: result.output,
        });
    }

    /// Increment the turn counter
    pub fn next_turn(&mut self) {
        self.turn += 1;
    }

    /// Output of the most recent successful observation
    pub fn last_successful_output(&self) -> Option<&str> {
        self.observations
            .iter()
            .rev()
            .find(|o| o.success && !o.output.trim().is_empty())
            .map(|o| o.output.as_str())
    }

    /// Freeze the loop into the history handed back to the caller
    pub fn into_history(self) -> AgentHistory {
        let completed = self.final_answer.is_some();
        let fallback = if completed {
            None
        } else {
            self.last_successful_output().map(str::to_string)
        };

        AgentHistory {
            steps: self
                .observations
                .into_iter()
                .map(|o| AgentStep {
                    turn: o.turn,
                    action: o.tool_name,
                    arguments: o.arguments,
                    success: o.success,
                    output: o.output,
                })
                .collect(),
            final_result: self.final_answer.or(fallback),
            completed,
            turns: self.turn,
        }
    }
}

/// An observation from a tool execution
#[derive(Debug, Clone)]
pub struct Observation {
    /// Turn the tool ran in
    pub turn: usize,
    /// Name of the tool that produced this observation
    pub tool_name: String,
    /// Arguments the model supplied
    pub arguments: serde_json::Value,
    /// Whether the tool execution was successful
    pub success: bool,
    /// Human-readable output from the tool
    pub output: String,
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}... [truncated]", cut)
}
