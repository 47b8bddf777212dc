use std::fmt;

use async_trait::async_trait;

/// Result of one task invocation. `Ok(())` lets the pipeline proceed to the
/// next task, `Err(Abort)` stops it. A task returns exactly once, so the
/// double-signaling hazard of callback-style control handles cannot occur.
pub type TaskResult = Result<(), Abort>;

/// A unit of asynchronous work executed against a shared pipeline context.
///
/// Tasks are driven strictly one at a time by the engine in [`crate::flow`];
/// the future does not need to be `Send` because contexts typically borrow
/// single-threaded state.
#[async_trait(?Send)]
pub trait FlowTask<C> {
    async fn run(&mut self, ctx: &mut C) -> TaskResult;
}

/// Why a task declined to proceed.
///
/// Carries a human-readable reason and, when the abort was triggered by an
/// underlying error, that error as the cause. Aborts are best-effort
/// diagnostics: the pipeline context may only be partially populated when one
/// is raised.
#[derive(Debug)]
pub struct Abort {
    reason: String,
    cause: Option<anyhow::Error>,
}

impl Abort {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            cause: None,
        }
    }

    pub fn caused_by(reason: impl Into<String>, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            reason: reason.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.reason, cause),
            None => write!(f, "{}", self.reason),
        }
    }
}

impl std::error::Error for Abort {}
