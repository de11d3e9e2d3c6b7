//! Browser agent
//!
//! The concrete [`TaskAgent`]: an LLM picks tools, the registry runs them
//! against agent-browser, and observations feed the next step
//! (Thought → Action → Observation) until the model calls `done`, answers
//! in plain text, or the step limit is hit.

use async_trait::async_trait;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::history::AgentHistory;
use crate::agent::loop_state::AgentLoopState;
use crate::agent::{AgentFactory, TaskAgent};
use crate::core::{Config, Message, Result, ToolResult};
use crate::llm::{create_provider, GenerateOptions, LLMProvider, LLMResponse};
use crate::tools::browser::BrowserExecutor;
use crate::tools::{HumanInput, StdinHuman, ToolRegistry};

const SYSTEM_PROMPT: &str = r#"You are a browser automation agent. You complete the user's task by operating a real web browser through tools.

## How pages are shown
After navigating or clicking you receive the interactive elements of the page, one per line:
  @e12: link "Sign in"
Use the ref (e12) with click_element, input_text and get_text. Refs change between pages, so always use refs from the LATEST observation.

## Rules
1. Call one or more tools per step. Read every observation before choosing the next action.
2. If there is no page yet, start with go_to_url or search_google. Use open_tab to keep a page while looking at another, and switch_tab to return to it.
3. Use extract_page_content to read results before reporting them.
4. If an action fails, try something else: go back, search, or scroll.
5. Use ask_human only when completely stuck or when the task needs information only the user has.
6. When the task is complete, call done with a complete answer containing every detail the user asked for."#;

/// Agent that drives a browser with an LLM
pub struct BrowserAgent {
    task: String,
    model: String,
    max_steps: usize,
    temperature: f32,
    llm: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
    launch_retries: u32,
    retry_delay: Duration,
    conversation_dir: Option<PathBuf>,
}

impl BrowserAgent {
    /// Create an agent for one task
    pub fn new(
        task: impl Into<String>,
        llm: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
        config: &Config,
    ) -> Self {
        Self {
            task: task.into(),
            model: config.agent.model.clone(),
            max_steps: config.agent.max_steps.max(1),
            temperature: config.agent.temperature,
            llm,
            tools,
            launch_retries: config.browser.launch_retries,
            retry_delay: Duration::from_secs(config.browser.retry_delay_secs),
            conversation_dir: config.agent.save_conversation.clone(),
        }
    }

    /// Dump the run to the conversation directory, if one is configured
    fn save_conversation(&self, history: &AgentHistory) {
        let Some(dir) = &self.conversation_dir else {
            return;
        };

        let name = format!("conversation_{}.json", Local::now().format("%Y%m%d_%H%M%S_%3f"));
        let path = dir.join(name);
        match history.save_json(&self.task, &self.model, &path) {
            Ok(()) => tracing::info!("conversation saved to {}", path.display()),
            Err(e) => tracing::warn!("could not save conversation: {}", e),
        }
    }

    /// Ask the model for the next action given everything observed so far
    async fn next_action(&self, state: &AgentLoopState) -> Result<LLMResponse> {
        let user_content = if state.observations.is_empty() {
            format!("Your task is: {}", self.task)
        } else {
            format!(
                "Your task is: {}{}",
                self.task,
                state.format_observations()
            )
        };

        let messages = vec![Message::system(SYSTEM_PROMPT), Message::user(user_content)];

        self.llm
            .chat_with_tools(
                &self.model,
                &messages,
                self.tools.definitions(),
                Some(GenerateOptions {
                    temperature: Some(self.temperature),
                    ..Default::default()
                }),
            )
            .await
    }

    async fn run_loop(&self, state: &mut AgentLoopState) -> Result<()> {
        while state.should_continue() {
            let turn = state.turn + 1;
            tracing::info!("step {}/{}", turn, state.max_turns);

            let response = self.next_action(state).await?;
            if let Some(usage) = &response.usage {
                tracing::debug!(
                    "{} tokens ({} prompt, {} completion)",
                    usage.total_tokens,
                    usage.prompt_tokens,
                    usage.completion_tokens
                );
            }

            if response.tool_calls.is_empty() {
                let answer = response.content.trim();
                state.next_turn();
                if answer.is_empty() {
                    tracing::debug!("empty reply without tool calls on step {}", turn);
                    continue;
                }
                state.final_answer = Some(answer.to_string());
                break;
            }

            // Tools run in order: page state depends on the previous action
            for call in &response.tool_calls {
                tracing::debug!("executing {} {}", call.name, call.arguments);

                let result = match self.tools.execute(call).await {
                    Ok(result) => result,
                    Err(e) => ToolResult::failure(&call.name, e.to_string()),
                };

                let status = if result.success { "✓" } else { "✗" };
                tracing::info!("  {} {}", status, result.tool_name);

                let done = result.is_done;
                state.record(call, result);
                if done {
                    break;
                }
            }

            state.next_turn();
        }

        Ok(())
    }
}

#[async_trait]
impl TaskAgent for BrowserAgent {
    async fn run(&mut self) -> Result<AgentHistory> {
        if self.tools.has_browser() {
            BrowserExecutor::ensure_available(self.launch_retries, self.retry_delay).await?;
        }

        tracing::info!("🚀 starting task: {}", self.task);

        let mut state = AgentLoopState::new(self.max_steps);
        let outcome = self.run_loop(&mut state).await;

        if let Some(browser) = self.tools.browser_executor() {
            if let Err(e) = browser.close().await {
                tracing::debug!("closing browser failed: {}", e);
            }
        }

        outcome?;

        if state.final_answer.is_some() {
            tracing::info!("✅ task completed in {} step(s)", state.turn);
        } else {
            tracing::warn!("❌ task not completed within {} steps", state.max_turns);
        }

        let history = state.into_history();
        self.save_conversation(&history);
        Ok(history)
    }
}

/// Builds a [`BrowserAgent`] per task from the process configuration
pub struct BrowserAgentFactory {
    config: Config,
    human: Arc<dyn HumanInput>,
}

impl BrowserAgentFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            human: Arc::new(StdinHuman),
        }
    }

    /// Route `ask_human` questions somewhere other than stdin
    pub fn with_human(mut self, human: Arc<dyn HumanInput>) -> Self {
        self.human = human;
        self
    }
}

impl AgentFactory for BrowserAgentFactory {
    fn create(&self, task: &str) -> Result<Box<dyn TaskAgent>> {
        let llm = create_provider(&self.config)?;
        let executor =
            BrowserExecutor::from_config(&self.config.browser, self.config.agent.telemetry);
        let tools = ToolRegistry::with_browser(executor, self.human.clone());

        Ok(Box::new(BrowserAgent::new(
            task,
            llm,
            Arc::new(tools),
            &self.config,
        )))
    }
}
