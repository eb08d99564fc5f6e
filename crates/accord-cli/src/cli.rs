use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "accord",
    about = "Lifecycle acceptance tests for cloud resources driven through Terraform",
    version
)]
pub struct Cli {
    /// Log line format.
    #[arg(long, value_enum, default_value = "text", env = "ACCORD_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the known lifecycle cases.
    Cases,

    /// Print the configuration documents a case applies.
    Render {
        /// Case name (see `accord cases`).
        case: String,

        /// Only print this step (1-based).
        #[arg(long)]
        step: Option<usize>,

        /// Harness settings YAML.
        #[arg(long, env = "ACCORD_SETTINGS")]
        settings: Option<PathBuf>,
    },

    /// Run a case against the real cloud, then destroy everything it created.
    Run {
        /// Case name (see `accord cases`).
        case: String,

        /// Harness settings YAML.
        #[arg(long, env = "ACCORD_SETTINGS")]
        settings: Option<PathBuf>,

        /// Root for per-run Terraform work directories.
        #[arg(long, env = "ACCORD_WORKDIR")]
        workdir: Option<PathBuf>,

        /// Terraform binary, overriding the settings file.
        #[arg(long, env = "ACCORD_TERRAFORM")]
        terraform: Option<String>,

        /// How destroyed resources are looked up.
        #[arg(long, value_enum, default_value = "oci-cli")]
        remote: RemoteArg,

        /// Report format.
        #[arg(long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RemoteArg {
    OciCli,
    Rest,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
