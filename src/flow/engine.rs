use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use super::progress::Progress;
use super::task::{Abort, FlowTask};

/// Periods at or below this threshold run `whilst` iterations back-to-back
/// instead of on a timer.
pub const PERIOD_THRESHOLD: Duration = Duration::from_millis(100);

/// Terminal failure of a pipeline. The caller still owns the context and can
/// inspect whatever partial state the tasks left behind.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("pipeline aborted at step {step} of {total}: {abort}")]
    Aborted {
        step: usize,
        total: usize,
        abort: Abort,
    },
    #[error("loop aborted on iteration {iteration}: {abort}")]
    LoopAborted { iteration: usize, abort: Abort },
}

impl FlowError {
    pub fn abort(&self) -> &Abort {
        match self {
            FlowError::Aborted { abort, .. } => abort,
            FlowError::LoopAborted { abort, .. } => abort,
        }
    }
}

/// Runs exactly one task. Equivalent to [`series`] with a single element:
/// progress is reset to one step, and the task's own result decides the
/// pipeline result. No retry.
pub async fn single<C>(
    progress: &mut dyn Progress,
    ctx: &mut C,
    task: &mut dyn FlowTask<C>,
) -> Result<(), FlowError> {
    progress.reset(1);
    tokio::task::yield_now().await;
    let result = task.run(ctx).await;
    progress.finish();
    result.map_err(|abort| FlowError::Aborted {
        step: 0,
        total: 1,
        abort,
    })
}

/// Runs tasks strictly in order; task *k+1* starts only after task *k*
/// completed successfully.
///
/// Progress is reset to the task count and ticked once per *completed* task:
/// the tick for task *k* fires when task *k+1* starts, so N successful tasks
/// produce N−1 ticks before the final `finish`. The first abort stops the
/// pipeline immediately — remaining tasks never run.
pub async fn series<C>(
    progress: &mut dyn Progress,
    ctx: &mut C,
    tasks: &mut [Box<dyn FlowTask<C> + '_>],
) -> Result<(), FlowError> {
    let total = tasks.len();
    progress.reset(total);
    for (step, task) in tasks.iter_mut().enumerate() {
        if step > 0 {
            progress.tick();
        }
        // Completion is always observed at an await point, even for tasks
        // whose work is synchronous; pipelines stay reentrant-safe.
        tokio::task::yield_now().await;
        if let Err(abort) = task.run(ctx).await {
            debug!(step, total, %abort, "series aborted");
            progress.finish();
            return Err(FlowError::Aborted { step, total, abort });
        }
    }
    progress.finish();
    Ok(())
}

/// Repeatedly runs the same task while `predicate(&ctx)` holds.
///
/// The predicate is evaluated only on iteration boundaries; the task is never
/// invoked after it has turned false. Completion of an iteration is observed
/// through side effects on the context, not through a pipeline advance. If
/// `period` exceeds [`PERIOD_THRESHOLD`] iterations are time-driven at that
/// period (the delay precedes each run); otherwise they run back-to-back with
/// a cooperative yield.
pub async fn whilst<C>(
    progress: &mut dyn Progress,
    ctx: &mut C,
    predicate: impl Fn(&C) -> bool,
    task: &mut dyn FlowTask<C>,
    period: Duration,
) -> Result<(), FlowError> {
    progress.reset(0);
    let time_driven = period > PERIOD_THRESHOLD;
    let mut iteration = 0usize;
    loop {
        if !predicate(&*ctx) {
            progress.finish();
            return Ok(());
        }
        if time_driven {
            tokio::time::sleep(period).await;
        } else {
            tokio::task::yield_now().await;
        }
        if let Err(abort) = task.run(ctx).await {
            debug!(iteration, %abort, "loop aborted");
            progress.finish();
            return Err(FlowError::LoopAborted { iteration, abort });
        }
        progress.tick();
        iteration += 1;
    }
}
