//! Task loop
//!
//! Runs one task at a time: build the prompt, hand it to an agent, save the
//! result, then ask whether to go again. End of input stops the loop.

use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::{run_task, AgentFactory};
use crate::cli::prompter::Prompter;
use crate::core::Config;
use crate::core::Result;
use crate::task::{ResultWriter, TaskOutcome, TaskRecord, TaskRequest};

const TASK_PROMPT: &str = "Enter your task: ";
const CONTINUE_PROMPT: &str = "Run another task? [y/N]: ";

/// What happened to one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Agent finished and the result was saved
    Completed { path: PathBuf },
    /// Agent failed, or the result could not be saved (`path` is `None`)
    Failed { path: Option<PathBuf>, reason: String },
    /// Input or configuration problem; the agent never ran and nothing was saved
    Rejected(String),
}

/// Interactive task session
pub struct Session<P: Prompter> {
    config: Config,
    factory: Arc<dyn AgentFactory>,
    writer: ResultWriter,
    prompter: P,
}

impl<P: Prompter> Session<P> {
    pub fn new(
        config: Config,
        factory: Arc<dyn AgentFactory>,
        writer: ResultWriter,
        prompter: P,
    ) -> Self {
        Self {
            config,
            factory,
            writer,
            prompter,
        }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Run tasks until the user declines to continue
    ///
    /// `first` is the task from the command line; when absent the first task
    /// is asked for. Later tasks are always asked for. Only a failure to read
    /// input is returned as an error.
    pub async fn run(&mut self, first: Option<TaskRequest>) -> Result<Vec<IterationOutcome>> {
        self.print_banner();

        let mut outcomes = Vec::new();
        let mut next = first;

        loop {
            let request = match next.take() {
                Some(request) => request,
                None => match self.prompter.read_line(TASK_PROMPT)? {
                    Some(line) => TaskRequest::generic(line),
                    None => break,
                },
            };

            outcomes.push(self.run_once(&request).await);

            if !self.prompter.confirm(CONTINUE_PROMPT)? {
                break;
            }
        }

        self.prompter.notify("Goodbye!");
        Ok(outcomes)
    }

    /// Execute a single task and record its result
    pub async fn run_once(&mut self, request: &TaskRequest) -> IterationOutcome {
        let prompt = match request.build_prompt() {
            Ok(prompt) => prompt,
            Err(e) => {
                self.prompter.notify(&format!("❌ {}", e));
                return IterationOutcome::Rejected(e.to_string());
            }
        };

        let started = Local::now();
        tracing::debug!("{} task: {}", request.kind(), prompt);
        self.prompter.notify(&format!("\n🚀 Running task: {}", prompt));

        let outcome = match run_task(self.factory.as_ref(), &prompt).await {
            Ok(history) => {
                if self.config.agent.show_history {
                    self.prompter
                        .notify(&format!("\nAction history:\n{}", history.format_actions()));
                }
                TaskOutcome::Success(history.result_text().to_string())
            }
            Err(e) if e.is_configuration() => {
                self.prompter.notify(&format!("❌ {}", e));
                return IterationOutcome::Rejected(e.to_string());
            }
            Err(e) => TaskOutcome::Failure(e.to_string()),
        };

        let record = TaskRecord::new(started, prompt, outcome);
        let saved = self.writer.write(&record);

        match (saved, &record.outcome) {
            (Ok(path), TaskOutcome::Success(text)) => {
                self.prompter.notify(&format!("\nResult:\n{}\n", text));
                self.prompter
                    .notify(&format!("✅ Task completed. Result saved to {}", path.display()));
                IterationOutcome::Completed { path }
            }
            (Ok(path), TaskOutcome::Failure(reason)) => {
                self.prompter.notify(&format!("❌ {}", reason));
                self.prompter
                    .notify(&format!("Details saved to {}", path.display()));
                IterationOutcome::Failed {
                    path: Some(path),
                    reason: reason.clone(),
                }
            }
            (Err(e), _) => {
                tracing::warn!("could not save result: {}", e);
                self.prompter
                    .notify(&format!("❌ Task failed: could not save result: {}", e));
                IterationOutcome::Failed {
                    path: None,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Print the startup banner
    fn print_banner(&mut self) {
        let banner = format!(
            "webpilot {}\nModel:   {} ({})\nResults: {}\n{}",
            env!("CARGO_PKG_VERSION"),
            self.config.agent.model,
            self.config.provider(),
            self.writer.dir().display(),
            "─".repeat(48)
        );
        self.prompter.notify(&banner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentHistory, TaskAgent};
    use crate::cli::prompter::ScriptedPrompter;
    use crate::core::PilotError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Echo;

    #[async_trait]
    impl TaskAgent for Echo {
        async fn run(&mut self) -> Result<AgentHistory> {
            Ok(AgentHistory::answered("echoed", 1))
        }
    }

    #[derive(Default)]
    struct Recording {
        tasks: Mutex<Vec<String>>,
    }

    impl AgentFactory for Recording {
        fn create(&self, task: &str) -> Result<Box<dyn TaskAgent>> {
            self.tasks.lock().unwrap().push(task.to_string());
            Ok(Box::new(Echo))
        }
    }

    struct NoKey;

    impl AgentFactory for NoKey {
        fn create(&self, _task: &str) -> Result<Box<dyn TaskAgent>> {
            Err(PilotError::missing_credential("openai", "OPENAI_API_KEY"))
        }
    }

    fn session(
        factory: Arc<dyn AgentFactory>,
        dir: &std::path::Path,
        answers: &[&str],
    ) -> Session<ScriptedPrompter> {
        let mut config = Config::default();
        config.agent.show_history = true;
        Session::new(
            config,
            factory,
            ResultWriter::new(dir, "task"),
            ScriptedPrompter::new(answers.iter().copied()),
        )
    }

    #[test]
    fn test_end_of_input_before_first_task() {
        let dir = tempfile::tempdir().unwrap();
        let factory = Arc::new(Recording::default());
        let mut session = session(factory.clone(), dir.path(), &[]);

        let outcomes = tokio_test::block_on(session.run(None)).unwrap();

        assert!(outcomes.is_empty());
        assert!(factory.tasks.lock().unwrap().is_empty());
        assert!(session.prompter().saw("Goodbye!"));
    }

    #[test]
    fn test_interactive_task_then_decline() {
        let dir = tempfile::tempdir().unwrap();
        let factory = Arc::new(Recording::default());
        let mut session = session(factory.clone(), dir.path(), &["  check the weather  ", "n"]);

        let outcomes = tokio_test::block_on(session.run(None)).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], IterationOutcome::Completed { .. }));
        assert_eq!(*factory.tasks.lock().unwrap(), vec!["check the weather".to_string()]);
        assert!(session.prompter().saw("Action history:"));
        assert_eq!(
            session.prompter().prompts,
            vec![TASK_PROMPT.to_string(), CONTINUE_PROMPT.to_string()]
        );
    }

    #[test]
    fn test_missing_credential_rejects_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        let mut session = session(Arc::new(NoKey), &results, &[]);

        let outcome =
            tokio_test::block_on(session.run_once(&TaskRequest::generic("open example.com")));

        match outcome {
            IterationOutcome::Rejected(msg) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!results.exists());
    }
}
