mod cli;
mod commands;
mod output;

use anyhow::Result;
use cli::{Cli, Command, LogFormat};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
    }

    match cli.command {
        Command::Cases => commands::cases(),
        Command::Render { case, step, settings } => commands::render(&case, step, settings),
        Command::Run {
            case,
            settings,
            workdir,
            terraform,
            remote,
            output,
        } => {
            let passed = commands::run(&case, settings, workdir, terraform, remote, output).await?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
