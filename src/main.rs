//! webpilot - browser automation tasks from the command line
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::sync::Arc;

use webpilot::cli::StdioPrompter;
use webpilot::core::logging;
use webpilot::{BrowserAgentFactory, Cli, Config, ResultWriter, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Build configuration
    let mut config = Config::load()?;

    // Apply CLI overrides
    cli.apply_overrides(&mut config);

    logging::init(config.agent.debug);

    let factory = Arc::new(BrowserAgentFactory::new(config.clone()));
    let writer = ResultWriter::from_config(&config.results);

    let mut session = Session::new(config, factory, writer, StdioPrompter);
    session.run(cli.task_request()).await?;

    Ok(())
}
