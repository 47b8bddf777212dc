use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::dispatcher::{DispatchTask, Dispatcher, OnFailure};
use super::error::DispatchError;
use super::operation::{Composite, Operation};
use super::result::CompositeResult;
use crate::flow::{self, FlowTask, NoProgress, TaskResult};

/// Default spacing between poll iterations.
pub const POLL_PERIOD: Duration = Duration::from_millis(500);

/// Terminal outcome of a poll. Dispatch failures during polling surface as
/// [`PollOutcome::TimedOut`] — the same class as an elapsed deadline — with
/// the last error kept for diagnostics.
#[derive(Debug)]
pub enum PollOutcome {
    Satisfied,
    TimedOut { last_error: Option<DispatchError> },
}

impl PollOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollOutcome::Satisfied)
    }
}

struct PollContext {
    start: Instant,
    satisfied: bool,
    last_error: Option<DispatchError>,
    attempts: u32,
}

impl PollContext {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            satisfied: false,
            last_error: None,
            attempts: 0,
        }
    }
}

struct SinglePollTask<'poll> {
    dispatcher: &'poll Dispatcher,
    operation: &'poll Operation,
    predicate: &'poll dyn Fn(&Value) -> bool,
}

#[async_trait(?Send)]
impl FlowTask<PollContext> for SinglePollTask<'_> {
    async fn run(&mut self, ctx: &mut PollContext) -> TaskResult {
        ctx.attempts += 1;
        match self.dispatcher.execute(self.operation).await {
            Ok(result) => ctx.satisfied = (self.predicate)(&result),
            Err(err) => {
                debug!(attempt = ctx.attempts, error = %err, "poll dispatch failed");
                ctx.last_error = Some(err);
            }
        }
        Ok(())
    }
}

/// Retries an operation, spaced by a fixed poll period, until a predicate
/// over the result is satisfied or the deadline elapses — whichever comes
/// first. Built entirely on [`flow::whilst`].
///
/// The deadline is wall-clock from poll start and checked on iteration
/// boundaries only, so the iteration in flight when it passes always
/// completes (overshoot of up to one round-trip).
pub struct TimeoutPoller {
    dispatcher: Arc<Dispatcher>,
    timeout: Duration,
    period: Duration,
}

impl TimeoutPoller {
    pub fn new(dispatcher: Arc<Dispatcher>, timeout: Duration) -> Self {
        Self {
            dispatcher,
            timeout,
            period: POLL_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Polls until the operation returns successfully.
    pub async fn execute(&self, operation: &Operation) -> PollOutcome {
        self.execute_until(operation, |_| true).await
    }

    /// Polls until the operation returns successfully and the predicate holds
    /// for its result.
    pub async fn execute_until(
        &self,
        operation: &Operation,
        predicate: impl Fn(&Value) -> bool,
    ) -> PollOutcome {
        let mut ctx = PollContext::new();
        let mut task = SinglePollTask {
            dispatcher: self.dispatcher.as_ref(),
            operation,
            predicate: &predicate,
        };
        let result = flow::whilst(
            &mut NoProgress,
            &mut ctx,
            |ctx| ctx.start.elapsed() <= self.timeout && !ctx.satisfied,
            &mut task,
            self.period,
        )
        .await;
        self.conclude(&operation.as_cli(), ctx, result.is_err())
    }

    /// Polls until every step of the composite succeeds.
    pub async fn execute_composite(&self, composite: &Composite) -> PollOutcome {
        self.execute_composite_until(composite, CompositeResult::all_succeeded)
            .await
    }

    /// Polls until the composite returns and the predicate holds for its
    /// demultiplexed result.
    pub async fn execute_composite_until(
        &self,
        composite: &Composite,
        predicate: impl Fn(&CompositeResult) -> bool,
    ) -> PollOutcome {
        let mut ctx = PollContext::new();
        let mut task = DispatchTask::new(
            self.dispatcher.clone(),
            composite.clone(),
            OnFailure::Proceed,
            |ctx: &mut PollContext, outcome| {
                ctx.attempts += 1;
                match outcome {
                    Ok(result) => ctx.satisfied = predicate(&result),
                    Err(err) => {
                        debug!(attempt = ctx.attempts, error = %err, "poll dispatch failed");
                        ctx.last_error = Some(err);
                    }
                }
            },
        );
        let result = flow::whilst(
            &mut NoProgress,
            &mut ctx,
            |ctx| ctx.start.elapsed() <= self.timeout && !ctx.satisfied,
            &mut task,
            self.period,
        )
        .await;
        self.conclude(&composite.as_cli(), ctx, result.is_err())
    }

    fn conclude(&self, cli: &str, ctx: PollContext, aborted: bool) -> PollOutcome {
        if ctx.satisfied && !aborted {
            debug!(
                operation = cli,
                attempts = ctx.attempts,
                "poll condition satisfied"
            );
            PollOutcome::Satisfied
        } else {
            warn!(
                operation = cli,
                attempts = ctx.attempts,
                timeout = ?self.timeout,
                last_error = ?ctx.last_error.as_ref().map(|err| err.to_string()),
                "poll ran into a timeout"
            );
            PollOutcome::TimedOut {
                last_error: ctx.last_error,
            }
        }
    }
}
