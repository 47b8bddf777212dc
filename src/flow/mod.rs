//! Flow control for the console's asynchronous pipelines.
//!
//! A pipeline is one execution of [`single`], [`series`] or [`whilst`] over
//! tasks sharing a typed context. Exactly one task is in flight at any time;
//! the engine never spawns, so steps of one pipeline cannot interleave with
//! each other.

pub mod engine;
pub mod progress;
pub mod task;

pub use engine::{series, single, whilst, FlowError, PERIOD_THRESHOLD};
pub use progress::{NoProgress, Progress, ProgressModel};
pub use task::{Abort, FlowTask, TaskResult};
