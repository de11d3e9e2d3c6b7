//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing tool calls to handlers.

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{Result, ToolCall, ToolCategory, ToolDefinition, ToolResult};
use crate::tools::browser::BrowserExecutor;
use crate::tools::human::HumanInput;

/// Name of the tool that ends a task
pub const DONE_TOOL: &str = "done";

/// Registry of available tools
pub struct ToolRegistry {
    /// Tool definitions in registration order
    definitions: Vec<ToolDefinition>,
    /// Tool categories
    categories: HashMap<String, ToolCategory>,
    /// Browser executor instance
    browser: Option<BrowserExecutor>,
    /// Answers `ask_human`
    human: Arc<dyn HumanInput>,
}

impl ToolRegistry {
    /// Create a registry with the control and human tools only
    pub fn new(human: Arc<dyn HumanInput>) -> Self {
        let mut registry = Self {
            definitions: Vec::new(),
            categories: HashMap::new(),
            browser: None,
            human,
        };

        registry.register_control_tools();
        registry
    }

    /// Create a registry with browser tools enabled
    pub fn with_browser(browser: BrowserExecutor, human: Arc<dyn HumanInput>) -> Self {
        let mut registry = Self::new(human);
        registry.browser = Some(browser);
        registry.register_browser_tools();
        registry
    }

    fn register_control_tools(&mut self) {
        self.register(
            ToolDefinition::function(
                DONE_TOOL,
                "Complete the task and report the final answer to the user",
                json!({
                    "type": "object",
                    "properties": {
                        "text": {
                            "type": "string",
                            "description": "Final answer with everything the user asked for"
                        }
                    },
                    "required": ["text"]
                }),
            ),
            ToolCategory::Control,
        );

        self.register(
            ToolDefinition::function(
                "ask_human",
                "Ask the user for information. Only when completely stuck \
                 or when the task needs details only the user has",
                json!({
                    "type": "object",
                    "properties": {
                        "question": {
                            "type": "string",
                            "description": "Question to show the user"
                        }
                    },
                    "required": ["question"]
                }),
            ),
            ToolCategory::Human,
        );
    }

    /// Register browser automation tools
    fn register_browser_tools(&mut self) {
        let ref_only = json!({
            "type": "object",
            "properties": {
                "ref": {
                    "type": "string",
                    "description": "Element ref from the latest snapshot (e.g., e1, e2)"
                }
            },
            "required": ["ref"]
        });

        self.register(
            ToolDefinition::function(
                "go_to_url",
                "Navigate to a URL and return the interactive elements of the page",
                json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "URL to open"
                        }
                    },
                    "required": ["url"]
                }),
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "search_google",
                "Search Google in the current tab",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query"
                        }
                    },
                    "required": ["query"]
                }),
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "go_back",
                "Go back to the previous page",
                json!({"type": "object", "properties": {}}),
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "open_tab",
                "Open a URL in a new tab and switch to it",
                json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "URL to open"
                        }
                    },
                    "required": ["url"]
                }),
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "switch_tab",
                "Switch to another open tab",
                json!({
                    "type": "object",
                    "properties": {
                        "page_id": {
                            "type": "integer",
                            "description": "Tab index, 0 for the first tab"
                        }
                    },
                    "required": ["page_id"]
                }),
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "click_element",
                "Click an element on the page by its ref from snapshot",
                ref_only.clone(),
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "input_text",
                "Fill text into an input field by its ref",
                json!({
                    "type": "object",
                    "properties": {
                        "ref": {
                            "type": "string",
                            "description": "Element ref from snapshot"
                        },
                        "text": {
                            "type": "string",
                            "description": "Text to enter"
                        }
                    },
                    "required": ["ref", "text"]
                }),
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "press_key",
                "Press a keyboard key, e.g. Enter or Tab",
                json!({
                    "type": "object",
                    "properties": {
                        "key": {
                            "type": "string",
                            "description": "Key name"
                        }
                    },
                    "required": ["key"]
                }),
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "scroll",
                "Scroll the page",
                json!({
                    "type": "object",
                    "properties": {
                        "direction": {
                            "type": "string",
                            "enum": ["up", "down", "left", "right"]
                        },
                        "pixels": {
                            "type": "integer",
                            "description": "Distance in pixels (optional)"
                        }
                    },
                    "required": ["direction"]
                }),
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "get_text",
                "Get text content from an element",
                ref_only,
            ),
            ToolCategory::Browser,
        );

        self.register(
            ToolDefinition::function(
                "extract_page_content",
                "Get the full text content of the current page",
                json!({"type": "object", "properties": {}}),
            ),
            ToolCategory::Browser,
        );
    }

    /// Register a tool definition
    pub fn register(&mut self, definition: ToolDefinition, category: ToolCategory) {
        let name = definition.name().to_string();
        self.definitions.retain(|d| d.name() != name);
        self.definitions.push(definition);
        self.categories.insert(name, category);
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Category of a registered tool
    pub fn category(&self, name: &str) -> Option<ToolCategory> {
        self.categories.get(name).copied()
    }

    /// Check if browser is enabled
    pub fn has_browser(&self) -> bool {
        self.browser.is_some()
    }

    /// Get the browser executor
    pub fn browser_executor(&self) -> Option<&BrowserExecutor> {
        self.browser.as_ref()
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_call: &ToolCall) -> Result<ToolResult> {
        match self.category(&tool_call.name) {
            Some(ToolCategory::Control) => Ok(self.execute_control_tool(tool_call)),
            Some(ToolCategory::Human) => self.execute_human_tool(tool_call).await,
            Some(ToolCategory::Browser) => self.execute_browser_tool(tool_call).await,
            None => Ok(ToolResult::failure(
                &tool_call.name,
                format!("Unknown tool: {}", tool_call.name),
            )),
        }
    }

    fn execute_control_tool(&self, tool_call: &ToolCall) -> ToolResult {
        let text = tool_call.get_string("text").unwrap_or_default();
        ToolResult::done(&tool_call.name, text.trim())
    }

    async fn execute_human_tool(&self, tool_call: &ToolCall) -> Result<ToolResult> {
        let question = match tool_call.get_string("question") {
            Some(q) if !q.trim().is_empty() => q,
            _ => return Ok(ToolResult::failure(&tool_call.name, "Missing 'question'")),
        };
        let answer = self.human.ask(&question).await?;
        Ok(ToolResult::success(&tool_call.name, answer))
    }

    /// Execute a browser tool
    async fn execute_browser_tool(&self, tool_call: &ToolCall) -> Result<ToolResult> {
        let browser = match &self.browser {
            Some(b) => b,
            None => {
                return Ok(ToolResult::failure(
                    &tool_call.name,
                    "Browser tools are not enabled",
                ))
            }
        };

        let arg = |key: &str| tool_call.get_string(key).unwrap_or_default();

        match tool_call.name.as_str() {
            "go_to_url" => browser.open(&arg("url")).await,
            "search_google" => browser.search_google(&arg("query")).await,
            "go_back" => browser.back().await,
            "open_tab" => browser.open_tab(&arg("url")).await,
            "switch_tab" => match tool_call.get_u32("page_id") {
                Some(index) => browser.switch_tab(index).await,
                None => Ok(ToolResult::failure(&tool_call.name, "Missing 'page_id'")),
            },
            "click_element" => browser.click(&arg("ref")).await,
            "input_text" => browser.fill(&arg("ref"), &arg("text")).await,
            "press_key" => browser.press(&arg("key")).await,
            "scroll" => {
                let direction = tool_call
                    .get_string("direction")
                    .unwrap_or_else(|| "down".to_string());
                browser.scroll(&direction, tool_call.get_u32("pixels")).await
            }
            "get_text" => browser.get_text(&arg("ref")).await,
            "extract_page_content" => browser.extract_content().await,
            _ => Ok(ToolResult::failure(
                &tool_call.name,
                format!("Unknown browser tool: {}", tool_call.name),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::human::CannedHuman;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(Arc::new(CannedHuman::new("aisle")))
    }

    #[test]
    fn test_base_registry_has_control_tools_only() {
        let registry = registry();
        let names: Vec<&str> = registry.definitions().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["done", "ask_human"]);
        assert!(!registry.has_browser());
    }

    #[test]
    fn test_browser_registry_registers_browser_tools() {
        let registry = ToolRegistry::with_browser(
            BrowserExecutor::new("test"),
            Arc::new(CannedHuman::new("")),
        );
        assert!(registry.has_browser());
        assert_eq!(registry.category("go_to_url"), Some(ToolCategory::Browser));
        assert_eq!(registry.category("extract_page_content"), Some(ToolCategory::Browser));
        assert_eq!(registry.definitions().len(), 13);
    }

    #[test]
    fn test_tab_tools_schema() {
        let registry = ToolRegistry::with_browser(
            BrowserExecutor::new("test"),
            Arc::new(CannedHuman::new("")),
        );
        assert_eq!(registry.category("open_tab"), Some(ToolCategory::Browser));
        assert_eq!(registry.category("switch_tab"), Some(ToolCategory::Browser));

        let switch = registry
            .definitions()
            .iter()
            .find(|d| d.name() == "switch_tab")
            .unwrap();
        assert_eq!(switch.function.parameters["required"], json!(["page_id"]));
        assert_eq!(
            switch.function.parameters["properties"]["page_id"]["type"],
            "integer"
        );
    }

    #[tokio::test]
    async fn test_switch_tab_requires_index() {
        let registry = ToolRegistry::with_browser(
            BrowserExecutor::new("test"),
            Arc::new(CannedHuman::new("")),
        );

        // Rejected before agent-browser is ever invoked
        let call = ToolCall::new("switch_tab", json!({"page_id": "second"}));
        let result = registry.execute(&call).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("page_id"));
    }

    #[tokio::test]
    async fn test_done_finishes_task() {
        let call = ToolCall::new(DONE_TOOL, json!({"text": " Cheapest fare is $420 "}));
        let result = registry().execute(&call).await.unwrap();
        assert!(result.is_done);
        assert_eq!(result.output, "Cheapest fare is $420");
    }

    #[tokio::test]
    async fn test_ask_human_uses_input_source() {
        let call = ToolCall::new("ask_human", json!({"question": "Window or aisle?"}));
        let result = registry().execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "aisle");

        let missing = ToolCall::new("ask_human", json!({}));
        assert!(!registry().execute(&missing).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_browser_tool_without_browser_fails_softly() {
        let mut registry = registry();
        registry.register(
            ToolDefinition::function("go_to_url", "Navigate", json!({"type": "object"})),
            ToolCategory::Browser,
        );

        let call = ToolCall::new("go_to_url", json!({"url": "https://example.com"}));
        let result = registry.execute(&call).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("not enabled"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let call = ToolCall::new("teleport", json!({}));
        let result = registry().execute(&call).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("Unknown tool"));
    }
}
