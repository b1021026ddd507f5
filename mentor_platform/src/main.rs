//! Main entry point for the mentoring platform CLI.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mentor_platform::{
    batch, cli,
    orchestrator::Orchestrator,
    server,
    session::{SessionService, SessionStatus},
    settings::Settings,
    telemetry,
    tools::{ToolContext, Toolkit},
    wait::BoundedWait,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let settings = Settings::load()?;
    telemetry::init(&settings.logging)?;

    match args.command {
        cli::Commands::Serve { addr } => server::serve(&settings, addr).await,
        ref command @ cli::Commands::Session { .. } => {
            let request = command
                .session_request()
                .context("session arguments missing")?;
            let orchestrator = Arc::new(Orchestrator::from_settings(&settings).await?);
            let service = SessionService::new(orchestrator, BoundedWait::from_config(&settings.session));

            let response = service.run(request).await;
            if let Some(report) = &response.report {
                println!("{}", report);
            }
            if let Some(message) = &response.message {
                eprintln!("{}", message);
            }
            match response.status {
                SessionStatus::Failed => anyhow::bail!("session failed"),
                _ => Ok(()),
            }
        }
        cli::Commands::Analyze { tool, input } => {
            let toolkit = Toolkit::standard()?;
            let finding = toolkit.run(&tool, &ToolContext::parse(&input))?;
            println!("{}", finding.to_json()?);
            Ok(())
        }
        cli::Commands::Batch { config } => batch::run(config, &settings).await,
    }
}
