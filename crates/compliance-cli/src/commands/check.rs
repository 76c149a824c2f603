use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use compliance_core::artifact::Artifact;
use compliance_core::catalog::RuleCatalog;
use compliance_core::config::{EngineConfig, FailOn};
use compliance_core::loader::load_catalog;
use compliance_core::predicate::{CancelToken, PredicateRegistry};
use compliance_core::types::Severity;
use compliance_engine::engine::ComplianceEngine;
use compliance_engine::types::ComplianceReport;
use compliance_output::ReportFormatter;

use crate::cli_args::Cli;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Blocking predicates still running at exit are abandoned after this.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// `--config <file>` if given, else `.compliance/config.json` under the cwd.
pub fn load_config(explicit: Option<&Path>) -> EngineConfig {
    match explicit {
        Some(path) => {
            if !path.exists() {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
            }
            EngineConfig::load_file(path)
        }
        None => match std::env::current_dir() {
            Ok(cwd) => EngineConfig::load(&cwd.join(".compliance")),
            Err(_) => EngineConfig::default(),
        },
    }
}

/// Run `compliance-check <artifact>... --catalog <file>...`.
pub fn run(formatter: &dyn ReportFormatter, config: &EngineConfig, cli: &Cli) -> i32 {
    let registry = PredicateRegistry::new();

    let mut catalogs = Vec::with_capacity(cli.catalogs.len());
    for path in &cli.catalogs {
        match load_catalog(path, &registry) {
            Ok(c) => {
                tracing::debug!(catalog = %path.display(), rules = c.len(), "catalog loaded");
                catalogs.push(c);
            }
            Err(e) => {
                eprintln!("compliance-check: {}", e);
                return EXIT_ERROR;
            }
        }
    }
    let catalog = RuleCatalog::merge_all(&catalogs);
    if catalog.is_empty() {
        eprintln!("compliance-check: no rules in the given catalogs");
        return EXIT_ERROR;
    }

    let mut artifacts = Vec::with_capacity(cli.artifacts.len());
    for path in &cli.artifacts {
        match Artifact::from_path(path, cli.domain.as_deref()) {
            Ok(a) => artifacts.push(Arc::new(a)),
            Err(e) => {
                eprintln!("compliance-check: {}", e);
                return EXIT_ERROR;
            }
        }
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("compliance-check: failed to start runtime: {}", e);
            return EXIT_ERROR;
        }
    };

    let engine = ComplianceEngine::with_config(config);
    let cancel = CancelToken::new();
    let catalog = Arc::new(catalog);
    let result = runtime.block_on(async {
        let watcher = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling run");
                watcher.cancel();
            }
        });
        engine.check_many(artifacts, catalog, &cancel).await
    });
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    let reports = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("compliance-check: {}", e);
            return EXIT_ERROR;
        }
    };

    println!("{}", formatter.format_reports(&reports));
    exit_code(&reports, config.fail_on)
}

/// `1` when any report holds a failing finding at or above `fail_on`.
/// Indeterminate findings never fail the run.
pub fn exit_code(reports: &[ComplianceReport], fail_on: FailOn) -> i32 {
    let failing = |s: Severity| match fail_on {
        FailOn::Critical => s == Severity::Critical,
        FailOn::Recommendation => matches!(s, Severity::Critical | Severity::Recommendation),
    };
    let any = reports
        .iter()
        .flat_map(|r| &r.findings)
        .any(|f| failing(f.severity));
    if any {
        EXIT_FINDINGS
    } else {
        EXIT_OK
    }
}
