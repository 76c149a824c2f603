use std::sync::Arc;
use std::time::Duration;

use compliance_core::artifact::Artifact;
use compliance_core::catalog::RuleCatalog;
use compliance_core::config::EngineConfig;
use compliance_core::predicate::{CancelToken, EvalContext};
use compliance_core::rule::Rule;
use compliance_core::types::{Location, Outcome, OutcomeStatus, Verdict};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::types::Analysis;

pub const REASON_TIMEOUT: &str = "timeout";
pub const REASON_CANCELLED: &str = "cancelled";

/// Evaluates every rule of a catalog against one artifact.
///
/// Applicable rules run on a bounded pool of blocking workers, each predicate
/// with its own deadline. A timed-out predicate still holds its pool slot
/// until its thread returns. Outcomes are merged by position once every worker
/// is done, so completion order never affects the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analyzer {
    timeout_per_rule: Duration,
    max_concurrency: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000), 8)
    }
}

impl Analyzer {
    pub fn new(timeout_per_rule: Duration, max_concurrency: usize) -> Self {
        Self {
            timeout_per_rule,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Duration::from_millis(config.timeout_ms),
            config.max_concurrency,
        )
    }

    pub fn timeout_per_rule(&self) -> Duration {
        self.timeout_per_rule
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Evaluate `catalog` against `artifact`.
    ///
    /// Never fails: predicate errors, panics, timeouts and cancellation all
    /// become `Indeterminate` outcomes for the rules they hit.
    pub async fn analyze(
        &self,
        artifact: Arc<Artifact>,
        catalog: &RuleCatalog,
        cancel: &CancelToken,
    ) -> Analysis {
        let rules = evaluation_order(catalog);
        let mut slots: Vec<Option<OutcomeStatus>> = vec![None; rules.len()];
        let mut pending = Vec::new();

        for (idx, rule) in rules.iter().enumerate() {
            if rule.applies_to(artifact.domain_tag()) {
                pending.push(idx);
            } else {
                tracing::debug!(rule = %rule.id, "not applicable to {}", artifact.domain_tag());
                slots[idx] = Some(OutcomeStatus::NotApplicable);
            }
        }

        let workers = pending.len().min(self.max_concurrency).max(1);
        let permits = Arc::new(Semaphore::new(workers));
        tracing::debug!(
            artifact = artifact.id(),
            rules = rules.len(),
            applicable = pending.len(),
            workers,
            "analysis started"
        );

        let mut tasks = JoinSet::new();
        for idx in pending {
            let rule = Arc::clone(&rules[idx]);
            let artifact = Arc::clone(&artifact);
            let permits = Arc::clone(&permits);
            let cancel = cancel.clone();
            let budget = self.timeout_per_rule;
            tasks.spawn(async move {
                let status = evaluate_rule(&rule, artifact, permits, &cancel, budget).await;
                (idx, status)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, status)) => slots[idx] = Some(status),
                Err(e) => tracing::warn!(error = %e, "rule evaluation task failed"),
            }
        }

        let outcomes: Vec<Outcome> = rules
            .iter()
            .zip(slots)
            .map(|(rule, slot)| {
                let status = slot.unwrap_or_else(|| OutcomeStatus::Indeterminate {
                    reason: "evaluation task aborted".to_string(),
                });
                Outcome::new(rule.id.clone(), status)
            })
            .collect();

        // Incomplete only when cancellation actually cut a rule short.
        let cancelled = outcomes.iter().any(|o| {
            matches!(&o.status, OutcomeStatus::Indeterminate { reason } if reason == REASON_CANCELLED)
        });
        Analysis {
            outcomes,
            cancelled,
        }
    }
}

/// Category (lexicographic), then id. Independent of catalog insertion order.
pub fn evaluation_order(catalog: &RuleCatalog) -> Vec<Arc<Rule>> {
    let mut rules: Vec<Arc<Rule>> = catalog.iter().cloned().collect();
    rules.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)));
    rules
}

async fn evaluate_rule(
    rule: &Rule,
    artifact: Arc<Artifact>,
    permits: Arc<Semaphore>,
    cancel: &CancelToken,
    budget: Duration,
) -> OutcomeStatus {
    // Held by the blocking closure until the predicate returns, past any timeout.
    let permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => return indeterminate(REASON_CANCELLED),
        permit = permits.acquire_owned() => match permit {
            Ok(p) => p,
            Err(_) => return indeterminate("worker pool closed"),
        },
    };

    tracing::trace!(rule = %rule.id, "evaluating");
    let ctx = EvalContext::new(cancel.clone(), Some(budget));
    let handle = ctx.clone();
    let predicate = Arc::clone(&rule.predicate);
    let task_artifact = Arc::clone(&artifact);
    let mut task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        predicate.evaluate(&task_artifact, &ctx)
    });

    let joined = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            handle.cancel();
            return indeterminate(REASON_CANCELLED);
        }
        joined = tokio::time::timeout(budget, &mut task) => joined,
    };

    let status = match joined {
        Err(_elapsed) => {
            handle.cancel();
            indeterminate(REASON_TIMEOUT)
        }
        Ok(Err(join_err)) => {
            indeterminate(format!("predicate error: {}", panic_message(join_err)))
        }
        // A cooperative predicate may notice its deadline before the timer fires.
        Ok(Ok(Err(_))) if handle.is_cancelled() => {
            if cancel.is_cancelled() {
                indeterminate(REASON_CANCELLED)
            } else {
                indeterminate(REASON_TIMEOUT)
            }
        }
        Ok(Ok(Err(e))) => indeterminate(format!("predicate error: {}", e)),
        Ok(Ok(Ok(Verdict::Pass))) => OutcomeStatus::Passed,
        Ok(Ok(Ok(Verdict::NotApplicable))) => OutcomeStatus::NotApplicable,
        Ok(Ok(Ok(Verdict::Fail(evidence)))) => {
            let location = match &evidence.span {
                Some(span) => Location::at_offset(artifact.id(), artifact.content(), span.start),
                None => Location::file(artifact.id()),
            };
            OutcomeStatus::Failed { evidence, location }
        }
    };

    match &status {
        OutcomeStatus::Indeterminate { reason } => {
            tracing::warn!(rule = %rule.id, reason = %reason, "rule not evaluated")
        }
        other => tracing::debug!(rule = %rule.id, outcome = ?other, "rule evaluated"),
    }
    status
}

fn indeterminate(reason: impl Into<String>) -> OutcomeStatus {
    OutcomeStatus::Indeterminate {
        reason: reason.into(),
    }
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "predicate panicked".to_string()
    }
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
