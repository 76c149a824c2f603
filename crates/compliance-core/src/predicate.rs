//! Rule predicates and the context they run in.
//!
//! A predicate is an opaque, pure check over an [`Artifact`]. Catalogs name
//! predicates through a `predicate_ref` string which a [`PredicateRegistry`]
//! resolves:
//! - `regex:<pattern>`: fails on the first match of the pattern
//! - `require:<pattern>`: fails when the pattern never matches
//! - `command:<program> [args...]`: runs a sub-process with the artifact on stdin
//! - anything else: a predicate registered by name

use std::collections::HashMap;
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use regex::Regex;
use tokio::sync::Notify;

use crate::artifact::Artifact;
use crate::error::{CatalogError, PredicateError};
use crate::types::{Evidence, Verdict};

/// A pass/fail check for one rule.
///
/// Implementations must not mutate shared state: the analyzer runs predicates
/// for the same artifact concurrently. Long-running predicates should poll
/// [`EvalContext::is_cancelled`] and return early once it turns true.
pub trait Predicate: Send + Sync {
    fn evaluate(&self, artifact: &Artifact, ctx: &EvalContext) -> Result<Verdict, PredicateError>;
}

impl<F> Predicate for F
where
    F: Fn(&Artifact, &EvalContext) -> Result<Verdict, PredicateError> + Send + Sync,
{
    fn evaluate(&self, artifact: &Artifact, ctx: &EvalContext) -> Result<Verdict, PredicateError> {
        self(artifact, ctx)
    }
}

/// Run-level cancellation signal shared by every in-flight predicate.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Execution context handed to a single predicate invocation.
///
/// Cancelled when the per-rule deadline passes, when the analyzer gives up on
/// the rule, or when the whole run is cancelled.
#[derive(Debug, Clone)]
pub struct EvalContext {
    deadline: Option<Instant>,
    local: Arc<AtomicBool>,
    run: CancelToken,
}

impl EvalContext {
    pub fn new(run: CancelToken, budget: Option<Duration>) -> Self {
        Self {
            deadline: budget.map(|b| Instant::now() + b),
            local: Arc::new(AtomicBool::new(false)),
            run,
        }
    }

    /// A context with no deadline that is never cancelled from outside.
    pub fn detached() -> Self {
        Self::new(CancelToken::new(), None)
    }

    pub fn cancel(&self) {
        self.local.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.local.load(Ordering::SeqCst)
            || self.run.is_cancelled()
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

/// Fails on the first match of a pattern.
#[derive(Debug)]
pub struct RegexPredicate {
    regex: Regex,
}

impl RegexPredicate {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }
}

impl Predicate for RegexPredicate {
    fn evaluate(&self, artifact: &Artifact, _ctx: &EvalContext) -> Result<Verdict, PredicateError> {
        let Some(caps) = self.regex.captures(artifact.content()) else {
            return Ok(Verdict::Pass);
        };
        let Some(whole) = caps.get(0) else {
            return Ok(Verdict::Pass);
        };

        let mut evidence = Evidence::new(whole.as_str()).with_span(whole.range());
        for (i, group) in caps.iter().enumerate() {
            if let Some(m) = group {
                evidence = evidence.with_capture(i.to_string(), m.as_str());
            }
        }
        for name in self.regex.capture_names().flatten() {
            if let Some(m) = caps.name(name) {
                evidence = evidence.with_capture(name, m.as_str());
            }
        }
        Ok(Verdict::Fail(evidence))
    }
}

/// Fails when a pattern never matches.
#[derive(Debug)]
pub struct RequirePredicate {
    regex: Regex,
}

impl RequirePredicate {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }
}

impl Predicate for RequirePredicate {
    fn evaluate(&self, artifact: &Artifact, _ctx: &EvalContext) -> Result<Verdict, PredicateError> {
        if self.regex.is_match(artifact.content()) {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail(Evidence::new(format!(
                "required pattern `{}` not found",
                self.regex.as_str()
            ))))
        }
    }
}

const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Exit status a command predicate uses to report "not applicable".
pub const COMMAND_EXIT_NOT_APPLICABLE: i32 = 77;

/// Shells out to an external checker.
///
/// The artifact content is written to the child's stdin; `COMPLIANCE_ARTIFACT`
/// and `COMPLIANCE_DOMAIN` are set in its environment. Exit 0 passes, exit 1
/// fails with stdout as evidence, exit 77 is not applicable, anything else is
/// a predicate error. The child is killed once the context is cancelled.
#[derive(Debug)]
pub struct CommandPredicate {
    program: String,
    args: Vec<String>,
}

impl CommandPredicate {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Predicate for CommandPredicate {
    fn evaluate(&self, artifact: &Artifact, ctx: &EvalContext) -> Result<Verdict, PredicateError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("COMPLIANCE_ARTIFACT", artifact.id())
            .env("COMPLIANCE_DOMAIN", artifact.domain_tag())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PredicateError::new(format!("failed to spawn {}: {}", self.program, e)))?;

        // Pipes are drained on helper threads so a chatty child cannot block on
        // a full buffer while we poll for exit.
        let writer = child.stdin.take().map(|mut stdin| {
            let content = artifact.content().to_owned();
            std::thread::spawn(move || {
                // The child may exit without reading its input.
                let _ = stdin.write_all(content.as_bytes());
            })
        });
        let stdout_reader = child.stdout.take().map(|mut out| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = out.read_to_string(&mut buf);
                buf
            })
        });
        let stderr_reader = child.stderr.take().map(|mut err| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf);
                buf
            })
        });

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if ctx.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PredicateError::new(format!("{} cancelled", self.program)));
            }
            std::thread::sleep(COMMAND_POLL_INTERVAL);
        };

        join_pipe(writer, ctx, &self.program)?;
        let stdout = join_pipe(stdout_reader, ctx, &self.program)?;
        let stderr = join_pipe(stderr_reader, ctx, &self.program)?;

        match status.code() {
            Some(0) => Ok(Verdict::Pass),
            Some(1) => {
                let text = stdout.trim();
                let snippet = if text.is_empty() {
                    format!("{} reported a violation", self.program)
                } else {
                    text.to_string()
                };
                Ok(Verdict::Fail(Evidence::new(snippet)))
            }
            Some(COMMAND_EXIT_NOT_APPLICABLE) => Ok(Verdict::NotApplicable),
            Some(code) => Err(PredicateError::new(format!(
                "{} exited with status {}: {}",
                self.program,
                code,
                stderr.trim()
            ))),
            None => Err(PredicateError::new(format!(
                "{} terminated by signal",
                self.program
            ))),
        }
    }
}

/// Wait for a pipe helper thread, giving up once the context is cancelled.
///
/// A grandchild that inherited the pipe keeps it open after the child exits.
fn join_pipe<T: Default>(
    handle: Option<JoinHandle<T>>,
    ctx: &EvalContext,
    program: &str,
) -> Result<T, PredicateError> {
    let Some(handle) = handle else {
        return Ok(T::default());
    };
    while !handle.is_finished() {
        if ctx.is_cancelled() {
            return Err(PredicateError::new(format!("{} cancelled", program)));
        }
        std::thread::sleep(COMMAND_POLL_INTERVAL);
    }
    Ok(handle.join().unwrap_or_default())
}

/// Resolves `predicate_ref` strings from catalogs into predicates.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    named: HashMap<String, Arc<dyn Predicate>>,
}

impl std::fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.named.keys().collect();
        names.sort();
        f.debug_struct("PredicateRegistry")
            .field("named", &names)
            .finish()
    }
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate under a bare name (no `scheme:` prefix).
    pub fn register(&mut self, name: impl Into<String>, predicate: impl Predicate + 'static) {
        self.named.insert(name.into(), Arc::new(predicate));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    pub fn resolve(
        &self,
        rule_id: &str,
        reference: &str,
    ) -> Result<Arc<dyn Predicate>, CatalogError> {
        if let Some(p) = self.named.get(reference) {
            return Ok(Arc::clone(p));
        }

        let invalid = |message: String| CatalogError::InvalidPredicate {
            rule_id: rule_id.to_string(),
            message,
        };

        match reference.split_once(':') {
            Some(("regex", pattern)) => {
                let regex = Regex::new(pattern).map_err(|e| invalid(e.to_string()))?;
                Ok(Arc::new(RegexPredicate::new(regex)))
            }
            Some(("require", pattern)) => {
                let regex = Regex::new(pattern).map_err(|e| invalid(e.to_string()))?;
                Ok(Arc::new(RequirePredicate::new(regex)))
            }
            Some(("command", line)) => {
                let mut parts = line.split_whitespace().map(String::from);
                let program = parts
                    .next()
                    .ok_or_else(|| invalid("command predicate has no program".to_string()))?;
                Ok(Arc::new(CommandPredicate::new(program, parts.collect())))
            }
            _ => Err(CatalogError::UnknownPredicate {
                rule_id: rule_id.to_string(),
                predicate_ref: reference.to_string(),
            }),
        }
    }
}
