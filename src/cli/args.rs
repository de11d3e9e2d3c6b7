//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::Config;
use crate::task::TaskRequest;

/// webpilot - browser automation tasks from the command line
#[derive(Parser, Debug)]
#[command(name = "webpilot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Model identifier [default: gpt-4]
    #[arg(long, short = 'm', global = true)]
    pub model: Option<String>,

    /// API key for the model's provider (falls back to the environment)
    #[arg(long, short = 'k', global = true)]
    pub api_key: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Run in headed browser mode (visible window)
    #[arg(long, global = true)]
    pub headed: bool,

    /// Maximum agent steps per task
    #[arg(long, global = true)]
    pub max_steps: Option<usize>,

    /// Directory for result files
    #[arg(long, global = true)]
    pub results_dir: Option<PathBuf>,

    /// Print the agent's actions after each task
    #[arg(long, global = true)]
    pub show_history: bool,

    /// Save each agent run as JSON in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub save_conversation: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a task described in plain language
    Run {
        /// What the agent should do; asked for interactively when omitted
        task: Option<String>,
    },

    /// Search a specific website
    Search {
        /// Site to open
        url: String,
        /// What to search for
        query: String,
    },

    /// Find flight options
    Flights {
        /// Departure city or airport
        from: String,
        /// Arrival city or airport
        to: String,
        /// Departure date, passed through as written
        date: String,
        /// Return date for round trips
        #[arg(long)]
        return_date: Option<String>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref model) = self.model {
            config.set_model(model.trim());
        }

        // After the model so the key lands on the right provider
        if let Some(ref key) = self.api_key {
            config.set_api_key(key.trim());
        }

        if self.debug {
            config.agent.debug = true;
        }

        if self.headed {
            config.browser.headed = true;
        }

        if let Some(steps) = self.max_steps {
            config.agent.max_steps = steps;
        }

        if let Some(ref dir) = self.results_dir {
            config.results.dir = dir.clone();
        }

        if self.show_history {
            config.agent.show_history = true;
        }

        if let Some(ref dir) = self.save_conversation {
            config.agent.save_conversation = Some(dir.clone());
        }
    }

    /// The task given on the command line, if any
    ///
    /// `None` means the first task is read interactively.
    pub fn task_request(&self) -> Option<TaskRequest> {
        match self.command.clone()? {
            Command::Run { task } => task.map(TaskRequest::generic),
            Command::Search { url, query } => Some(TaskRequest::site_search(url, query)),
            Command::Flights {
                from,
                to,
                date,
                return_date,
            } => Some(TaskRequest::flight_search(from, to, date, return_date)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Credentials;
    use crate::core::ProviderKind;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("webpilot").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flights_subcommand() {
        let cli = parse(&["flights", "NYC", "LAX", "2025-03-01", "--return-date", "2025-03-08"]);
        let prompt = cli.task_request().unwrap().build_prompt().unwrap();
        assert_eq!(
            prompt,
            "find flight options from NYC to LAX on 2025-03-01, returning on 2025-03-08"
        );
    }

    #[test]
    fn test_search_subcommand() {
        let cli = parse(&["search", "https://news.ycombinator.com", "rust"]);
        assert_eq!(
            cli.task_request(),
            Some(TaskRequest::site_search("https://news.ycombinator.com", "rust"))
        );
    }

    #[test]
    fn test_run_without_task_is_interactive() {
        assert_eq!(parse(&["run"]).task_request(), None);
        assert_eq!(parse(&[]).task_request(), None);
        assert_eq!(
            parse(&["run", "find the weather in Oslo"]).task_request(),
            Some(TaskRequest::generic("find the weather in Oslo"))
        );
    }

    #[test]
    fn test_missing_positional_is_rejected() {
        assert!(Cli::try_parse_from(["webpilot", "flights", "NYC", "LAX"]).is_err());
        assert!(Cli::try_parse_from(["webpilot", "search", "https://example.com"]).is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = parse(&[
            "search",
            "example.com",
            "shoes",
            "-m",
            "claude-3-5-sonnet-20240620",
            "-k",
            "sk-ant",
        ]);

        let mut config = Config::default();
        config.credentials = Credentials::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.provider(), ProviderKind::Anthropic);
        assert_eq!(config.api_key().unwrap(), "sk-ant");
    }

    #[test]
    fn test_overrides() {
        let cli = parse(&[
            "--max-steps",
            "5",
            "--results-dir",
            "out",
            "--headed",
            "--show-history",
            "--save-conversation",
            "runs",
            "run",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.agent.max_steps, 5);
        assert_eq!(config.results.dir, PathBuf::from("out"));
        assert!(config.browser.headed);
        assert!(config.agent.show_history);
        assert_eq!(config.agent.save_conversation, Some(PathBuf::from("runs")));
    }
}
