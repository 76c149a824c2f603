//! compliance-check CLI: checks artifacts against standards rule catalogs.
//!
//! Reports go to stdout; logs go to stderr. See `compliance-check --help`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod commands;

use cli_args::{Cli, OutputFormat};
use compliance_core::config::EngineConfig;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = commands::check::load_config(cli.config.as_deref());
    let formatter: Box<dyn compliance_output::ReportFormatter> = match cli.format {
        OutputFormat::Json => Box::new(compliance_output::json::JsonFormatter::new(
            config.banners.clone(),
        )),
        OutputFormat::Md => Box::new(compliance_output::markdown::MarkdownFormatter::new(
            config.banners.clone(),
        )),
    };

    let config = apply_overrides(config, &cli);
    let exit_code = commands::check::run(&*formatter, &config, &cli);
    std::process::exit(exit_code);
}

/// `RUST_LOG` wins unless `--verbose` is given; default `warn`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// CLI flags override config values.
fn apply_overrides(mut config: EngineConfig, cli: &Cli) -> EngineConfig {
    if let Some(ms) = cli.timeout {
        config.timeout_ms = ms;
    }
    if let Some(n) = cli.max_concurrency {
        config.max_concurrency = n;
    }
    if let Some(fail_on) = cli.fail_on {
        config.fail_on = fail_on.into();
    }
    config
}
