//! Flow engine pipeline properties: strict ordering, progress accounting,
//! and abort semantics over arbitrary task counts.

use async_trait::async_trait;
use proptest::prelude::*;

use switchboard::flow::{self, Abort, FlowError, FlowTask, Progress, TaskResult};

#[derive(Default)]
struct Trace {
    ran: Vec<usize>,
}

struct Step {
    index: usize,
    fail: bool,
}

#[async_trait(?Send)]
impl FlowTask<Trace> for Step {
    async fn run(&mut self, ctx: &mut Trace) -> TaskResult {
        ctx.ran.push(self.index);
        if self.fail {
            Err(Abort::new(format!("step {} refused", self.index)))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default)]
struct RecordingProgress {
    resets: Vec<usize>,
    ticks: usize,
    finishes: usize,
}

impl Progress for RecordingProgress {
    fn reset(&mut self, steps: usize) {
        self.resets.push(steps);
    }

    fn tick(&mut self) {
        self.ticks += 1;
    }

    fn finish(&mut self) {
        self.finishes += 1;
    }
}

fn tasks(count: usize, fail_at: Option<usize>) -> Vec<Box<dyn FlowTask<Trace>>> {
    (0..count)
        .map(|index| {
            Box::new(Step {
                index,
                fail: fail_at == Some(index),
            }) as Box<dyn FlowTask<Trace>>
        })
        .collect()
}

fn run_series(
    count: usize,
    fail_at: Option<usize>,
) -> (Trace, RecordingProgress, Result<(), FlowError>) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let mut ctx = Trace::default();
    let mut progress = RecordingProgress::default();
    let mut series_tasks = tasks(count, fail_at);
    let result =
        runtime.block_on(flow::series(&mut progress, &mut ctx, &mut series_tasks));
    (ctx, progress, result)
}

proptest! {
    /// Tasks run in strict index order; no task starts before its
    /// predecessor proceeded.
    #[test]
    fn series_preserves_strict_order(count in 1usize..12) {
        let (ctx, _, result) = run_series(count, None);
        prop_assert!(result.is_ok());
        prop_assert_eq!(ctx.ran, (0..count).collect::<Vec<_>>());
    }

    /// N successful tasks tick N-1 times before the single finish.
    #[test]
    fn series_ticks_completed_steps_only(count in 1usize..12) {
        let (_, progress, result) = run_series(count, None);
        prop_assert!(result.is_ok());
        prop_assert_eq!(progress.resets.clone(), vec![count]);
        prop_assert_eq!(progress.ticks, count - 1);
        prop_assert_eq!(progress.finishes, 1);
    }

    /// An abort at step k runs exactly the prefix 0..=k and fails once.
    #[test]
    fn abort_stops_after_the_failing_task(count in 1usize..12, fail_at in 0usize..12) {
        prop_assume!(fail_at < count);
        let (ctx, progress, result) = run_series(count, Some(fail_at));
        prop_assert_eq!(ctx.ran, (0..=fail_at).collect::<Vec<_>>());
        prop_assert_eq!(progress.finishes, 1);
        let aborted_at_k = matches!(
            &result,
            Err(FlowError::Aborted { step, total, .. }) if *step == fail_at && *total == count
        );
        prop_assert!(aborted_at_k, "unexpected result: {:?}", result);
    }
}

#[test]
fn single_is_equivalent_to_a_one_task_series() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let mut single_ctx = Trace::default();
    let mut single_progress = RecordingProgress::default();
    let mut task = Step {
        index: 0,
        fail: false,
    };
    runtime
        .block_on(flow::single(
            &mut single_progress,
            &mut single_ctx,
            &mut task,
        ))
        .unwrap();

    let (series_ctx, series_progress, result) = run_series(1, None);
    assert!(result.is_ok());
    assert_eq!(single_ctx.ran, series_ctx.ran);
    assert_eq!(single_progress.resets, series_progress.resets);
    assert_eq!(single_progress.ticks, series_progress.ticks);
    assert_eq!(single_progress.finishes, series_progress.finishes);
}
