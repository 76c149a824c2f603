use std::sync::Arc;

use compliance_core::artifact::Artifact;
use compliance_core::catalog::RuleCatalog;
use compliance_core::config::EngineConfig;
use compliance_core::error::FatalError;
use compliance_core::predicate::CancelToken;
use tokio::task::JoinSet;

use crate::analyzer::Analyzer;
use crate::diff::DiffGenerator;
use crate::report::build_report;
use crate::types::ComplianceReport;

/// Analysis plus reporting for one or more artifacts against a catalog.
#[derive(Debug, Clone, Default)]
pub struct ComplianceEngine {
    analyzer: Analyzer,
    diffs: DiffGenerator,
}

impl ComplianceEngine {
    pub fn new(analyzer: Analyzer, diffs: DiffGenerator) -> Self {
        Self { analyzer, diffs }
    }

    /// Create an engine configured from an `EngineConfig`.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            analyzer: Analyzer::from_config(config),
            diffs: DiffGenerator::new(config.context_lines),
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Analyze one artifact and build its report.
    pub async fn check(
        &self,
        artifact: Arc<Artifact>,
        catalog: &RuleCatalog,
        cancel: &CancelToken,
    ) -> Result<ComplianceReport, FatalError> {
        if catalog.is_empty() {
            return Err(FatalError::EmptyCatalog);
        }
        let analysis = self
            .analyzer
            .analyze(Arc::clone(&artifact), catalog, cancel)
            .await;
        let report = build_report(&artifact, catalog, &analysis, &self.diffs);
        tracing::info!(
            artifact = artifact.id(),
            score = %report.score,
            coverage = %report.coverage,
            findings = report.findings.len(),
            incomplete = report.incomplete,
            "artifact checked"
        );
        Ok(report)
    }

    /// Check several artifacts concurrently. Reports come back in input order.
    pub async fn check_many(
        &self,
        artifacts: Vec<Arc<Artifact>>,
        catalog: Arc<RuleCatalog>,
        cancel: &CancelToken,
    ) -> Result<Vec<ComplianceReport>, FatalError> {
        if catalog.is_empty() {
            return Err(FatalError::EmptyCatalog);
        }
        let mut tasks = JoinSet::new();
        for (idx, artifact) in artifacts.into_iter().enumerate() {
            let engine = self.clone();
            let catalog = Arc::clone(&catalog);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let report = engine.check(artifact, &catalog, &cancel).await;
                (idx, report)
            });
        }

        let mut slots: Vec<Option<ComplianceReport>> = vec![None; tasks.len()];
        while let Some(joined) = tasks.join_next().await {
            let (idx, report) = joined
                .map_err(|e| FatalError::Internal(format!("artifact check task failed: {}", e)))?;
            slots[idx] = Some(report?);
        }
        slots
            .into_iter()
            .map(|r| r.ok_or_else(|| FatalError::Internal("missing report".to_string())))
            .collect()
    }
}
