//! Task loop integration tests
//!
//! Run the CLI session against a stand-in agent and check what lands in the
//! results directory.

use async_trait::async_trait;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use webpilot::cli::{Cli, IterationOutcome, ScriptedPrompter, Session};
use webpilot::core::config::Credentials;
use webpilot::{AgentFactory, AgentHistory, Config, PilotError, Result, ResultWriter, TaskAgent};

/// What the stand-in agent does when run
#[derive(Clone)]
enum Behavior {
    Answer(&'static str),
    Fail(&'static str),
}

struct StandIn(Behavior);

#[async_trait]
impl TaskAgent for StandIn {
    async fn run(&mut self) -> Result<AgentHistory> {
        match &self.0 {
            Behavior::Answer(text) => Ok(AgentHistory::answered(*text, 3)),
            Behavior::Fail(msg) => Err(PilotError::provider(*msg)),
        }
    }
}

/// Records every prompt it is asked to build an agent for
struct StandInFactory {
    behavior: Behavior,
    prompts: Mutex<Vec<String>>,
}

impl StandInFactory {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl AgentFactory for StandInFactory {
    fn create(&self, task: &str) -> Result<Box<dyn TaskAgent>> {
        self.prompts.lock().unwrap().push(task.to_string());
        Ok(Box::new(StandIn(self.behavior.clone())))
    }
}

fn session(
    factory: Arc<dyn AgentFactory>,
    results: &Path,
    answers: &[&str],
) -> Session<ScriptedPrompter> {
    Session::new(
        Config::default(),
        factory,
        ResultWriter::new(results, "task"),
        ScriptedPrompter::new(answers.iter().copied()),
    )
}

fn cli(args: &[&str]) -> Cli {
    use clap::Parser;
    Cli::try_parse_from(std::iter::once("webpilot").chain(args.iter().copied())).unwrap()
}

fn result_files(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = match fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

#[tokio::test]
async fn test_flights_task_writes_result_file() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    let factory = StandInFactory::new(Behavior::Answer("Cheapest: $420 on Delta"));

    let args = cli(&["flights", "NYC", "LAX", "2025-03-01"]);
    let mut session = session(factory.clone(), &results, &["n"]);
    let outcomes = session.run(args.task_request()).await.unwrap();

    assert_eq!(
        factory.prompts(),
        vec!["find flight options from NYC to LAX on 2025-03-01".to_string()]
    );

    let path = match &outcomes[..] {
        [IterationOutcome::Completed { path }] => path.clone(),
        other => panic!("unexpected outcomes: {:?}", other),
    };

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("task_") && name.ends_with(".md"), "{}", name);
    // task_YYYYMMDD_HHMMSS.md
    assert_eq!(name.len(), "task_20250301_120000.md".len());

    let content = fs::read_to_string(&path).unwrap();
    let timestamp = content.find("**Timestamp:**").unwrap();
    let task = content.find("find flight options from NYC to LAX on 2025-03-01").unwrap();
    let result = content.find("Cheapest: $420 on Delta").unwrap();
    assert!(timestamp < task && task < result);
}

#[tokio::test]
async fn test_search_task_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let factory = StandInFactory::new(Behavior::Answer("3 matching products"));

    let args = cli(&["search", "https://shop.example.com", "red shoes"]);
    let mut session = session(factory.clone(), dir.path(), &[]);
    session.run(args.task_request()).await.unwrap();

    assert_eq!(
        factory.prompts(),
        vec!["navigate to https://shop.example.com and search for red shoes".to_string()]
    );
    assert_eq!(result_files(dir.path()).len(), 1);
}

#[tokio::test]
async fn test_blank_argument_never_reaches_agent() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    let factory = StandInFactory::new(Behavior::Answer("unused"));

    let args = cli(&["search", "https://example.com", "   "]);
    let mut session = session(factory.clone(), &results, &["n"]);
    let outcomes = session.run(args.task_request()).await.unwrap();

    assert!(matches!(&outcomes[..], [IterationOutcome::Rejected(_)]));
    assert!(factory.prompts().is_empty());
    assert!(result_files(&results).is_empty());
    // Still asked whether to continue
    assert_eq!(session.prompter().prompts.len(), 1);
}

#[tokio::test]
async fn test_agent_failure_is_saved() {
    let dir = tempfile::tempdir().unwrap();
    let factory = StandInFactory::new(Behavior::Fail("OpenAI API error (500): upstream down"));

    let mut session = session(factory, dir.path(), &["check my inbox", "n"]);
    let outcomes = session.run(None).await.unwrap();

    let path = match &outcomes[..] {
        [IterationOutcome::Failed { path: Some(path), reason }] => {
            assert!(reason.starts_with("Task execution failed:"));
            path.clone()
        }
        other => panic!("unexpected outcomes: {:?}", other),
    };

    let content = fs::read_to_string(path).unwrap();
    assert!(content.contains("## Result (failed)"));
    assert!(content.contains("upstream down"));
}

#[tokio::test]
async fn test_continue_runs_second_task() {
    let dir = tempfile::tempdir().unwrap();
    let factory = StandInFactory::new(Behavior::Answer("done"));

    let args = cli(&["run", "first task"]);
    let mut session = session(factory.clone(), dir.path(), &["y", "  second task ", "no"]);
    let outcomes = session.run(args.task_request()).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        factory.prompts(),
        vec!["first task".to_string(), "second task".to_string()]
    );
    // Same-second tasks get distinct files
    assert_eq!(result_files(dir.path()).len(), 2);
}

#[tokio::test]
async fn test_end_of_input_after_task_exits() {
    let dir = tempfile::tempdir().unwrap();
    let factory = StandInFactory::new(Behavior::Answer("done"));

    let mut session = session(factory.clone(), dir.path(), &["only task"]);
    let outcomes = session.run(None).await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(session.prompter().saw("Goodbye!"));
}

#[tokio::test]
async fn test_missing_credential_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");

    let mut config = Config::default();
    config.credentials = Credentials::default();
    config.set_model("gpt-4");
    let factory = Arc::new(webpilot::BrowserAgentFactory::new(config.clone()));

    let mut session = Session::new(
        config,
        factory,
        ResultWriter::new(&results, "task"),
        ScriptedPrompter::new(["find the weather in Oslo", "n"]),
    );
    let outcomes = session.run(None).await.unwrap();

    match &outcomes[..] {
        [IterationOutcome::Rejected(msg)] => assert!(msg.contains("OPENAI_API_KEY")),
        other => panic!("unexpected outcomes: {:?}", other),
    }
    assert!(!results.exists());
    assert!(session.prompter().saw("Missing credential"));
}

#[tokio::test]
async fn test_unwritable_results_dir_counts_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A file where the directory should be
    let blocked = dir.path().join("results");
    fs::write(&blocked, "not a directory").unwrap();

    let factory = StandInFactory::new(Behavior::Answer("all good"));
    let mut session = session(factory, &blocked, &[]);
    let outcome = session
        .run_once(&webpilot::TaskRequest::generic("anything"))
        .await;

    assert!(matches!(outcome, IterationOutcome::Failed { path: None, .. }));
}
