use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use compliance_core::config::FailOn;

#[derive(Parser, Debug)]
#[command(
    name = "compliance-check",
    version,
    about = "Check artifacts against standards rule catalogs"
)]
pub(crate) struct Cli {
    /// Artifacts to check
    #[arg(required = true)]
    pub artifacts: Vec<PathBuf>,

    /// Rule catalog (JSON or YAML); repeat to merge, later catalogs win
    #[arg(long = "catalog", short = 'c', required = true)]
    pub catalogs: Vec<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Md)]
    pub format: OutputFormat,

    /// Lowest severity that fails the run
    #[arg(long, value_enum)]
    pub fail_on: Option<FailOnArg>,

    /// Per-rule timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum rules evaluated concurrently
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Domain tag for every artifact (default: inferred from extension)
    #[arg(long)]
    pub domain: Option<String>,

    /// Config file (default: .compliance/config.json)
    #[arg(long, env = "COMPLIANCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Markdown
    #[value(alias = "markdown")]
    Md,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FailOnArg {
    Critical,
    Recommendation,
}

impl From<FailOnArg> for FailOn {
    fn from(arg: FailOnArg) -> Self {
        match arg {
            FailOnArg::Critical => FailOn::Critical,
            FailOnArg::Recommendation => FailOn::Recommendation,
        }
    }
}

#[cfg(test)]
#[path = "cli_args_tests.rs"]
mod tests;
